use std::{fs, path::Path};

use clap::Parser;
use tempfile::tempdir;

use quartz_cli::{Args, run};

const DOCUMENT: &str = r#"#PROP_text
type: string = "PROP"
entries: map[hash,embed] = {
    "fx/q" = VfxSystemDefinitionData {
        complexEmitterDefinitionData: list[pointer] = {
            VfxEmitterDefinitionData {
                emitterName: string = "Spark"
                blendMode: u8 = 1
                texture: string = "ASSETS/fx/spark.dds"
                color: vec4 = { 1, 0, 0, 1 }
            }
            VfxEmitterDefinitionData {
                emitterName: string = "Glow"
                blendMode: u8 = 4
            }
        }
        particleName: string = "q"
        particlePath: string = "fx/q"
    }
    "Res" = ResourceResolver {
        resourceMap: map[hash,link] = {
            "fx/q" = "fx/q"
        }
    }
}
"#;

fn args(items: &[&str]) -> Args {
    let mut argv = vec!["quartz", "--log-level", "off"];
    argv.extend_from_slice(items);
    Args::try_parse_from(argv).expect("arguments should parse")
}

fn write_input(dir: &Path) -> String {
    let path = dir.join("fx.py");
    fs::write(&path, DOCUMENT).expect("write input");
    path.to_string_lossy().to_string()
}

#[test]
fn e2e_randomize_with_assets() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path());
    let output = dir.path().join("out.py");
    let provenance = dir.path().join("provenance.toml");
    fs::create_dir_all(dir.path().join("assets/fx")).unwrap();
    fs::write(dir.path().join("assets/fx/spark.dds"), b"dds").unwrap();
    let root = dir.path().to_string_lossy().to_string();

    run(&args(&[
        "randomize",
        &input,
        "-o",
        &output.to_string_lossy(),
        "-s",
        "fx/q",
        "-e",
        "Spark",
        "--suffix",
        "fire,ice",
        "--isolate-assets",
        "--provenance",
        &provenance.to_string_lossy(),
        "--copy-assets",
        &root,
    ]))
    .unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"fx/q_fire\" = VfxSystemDefinitionData {"));
    assert!(text.contains("emitterName: string = \"Spark_randomized\""));
    assert!(text.contains("texture: string = \"ASSETS/ice/spark.dds\""));

    let record = fs::read_to_string(&provenance).unwrap();
    assert!(record.contains("original_path = \"ASSETS/fx/spark.dds\""));
    assert!(dir.path().join("ASSETS/fire/spark.dds").is_file());
    assert!(dir.path().join("ASSETS/_backup/spark.dds").is_file());

    // The input is left alone when an output path is given.
    assert_eq!(fs::read_to_string(&input).unwrap(), DOCUMENT);
}

#[test]
fn e2e_split_and_blend_mode_in_place() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path());

    run(&args(&["split", &input])).unwrap();
    let text = fs::read_to_string(&input).unwrap();
    assert!(text.contains("\"REC_q_Spark\" = VfxSystemDefinitionData {"));
    assert!(text.contains("emitterName: string = \"Trigger_2_Glow\""));

    run(&args(&["blend-mode", &input, "-s", "REC_q_Glow", "--value", "0"])).unwrap();
    let text = fs::read_to_string(&input).unwrap();
    assert!(text.contains("blendMode: u8 = 0"));
    assert!(!text.contains("blendMode: u8 = 4"));
}

#[test]
fn e2e_recolor_is_reproducible() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path());
    let first = dir.path().join("a.py");
    let second = dir.path().join("b.py");

    for output in [&first, &second] {
        run(&args(&[
            "recolor",
            &input,
            "-o",
            &output.to_string_lossy(),
            "-m",
            "random",
            "--colors",
            "#00ff00,#0000ff,#ffff00",
            "--seed",
            "11",
        ]))
        .unwrap();
    }
    let text = fs::read_to_string(&first).unwrap();
    assert_eq!(text, fs::read_to_string(&second).unwrap());
    assert!(!text.contains("color: vec4 = { 1, 0, 0, 1 }"));
}

#[test]
fn e2e_failures_are_reported() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = write_input(dir.path());

    let missing_system = args(&["randomize", &input, "-s", "fx/none", "--suffix", "fire"]);
    assert!(run(&missing_system).is_err());
    assert_eq!(fs::read_to_string(&input).unwrap(), DOCUMENT);

    let no_palette = args(&["recolor", &input, "-m", "linear"]);
    assert!(run(&no_palette).is_err());

    let unbalanced = dir.path().join("broken.py");
    let text = "entries: map[hash,embed] = {\n    \"a\" = VfxSystemDefinitionData {\n";
    fs::write(&unbalanced, text).unwrap();
    let strict = args(&["--strict", "list", &unbalanced.to_string_lossy()]);
    assert!(run(&strict).is_err());
    let lenient = args(&["list", &unbalanced.to_string_lossy()]);
    assert!(run(&lenient).is_ok());
}
