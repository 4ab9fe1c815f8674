//! Unit tests for the single-pass indexer.

use quartz_core::{
    field::ColorField,
    lines::{LineStore, ScanMode},
};

use crate::{
    error::{ErrorCode, Severity},
    index::{IndexConfig, index_document},
    document::ParsedDocument,
};

const ORB: &str = "Characters/Ahri/Skins/Skin0/Particles/Ahri_Q_Orb";

const SAMPLE: &str = r#"#PROP_text
type: string = "PROP"
version: u32 = 3
linked: list[string] = {
    "DATA/Characters/Ahri/Ahri.bin"
}
entries: map[hash,embed] = {
    "Characters/Ahri/Skins/Skin0/Particles/Ahri_Q_Orb" = VfxSystemDefinitionData {
        complexEmitterDefinitionData: list[pointer] = {
            VfxEmitterDefinitionData {
                rate: embed = ValueFloat {
                    constantValue: f32 = 1
                }
                emitterName: string = "Spark"
                blendMode: u8 = 1
                texture: string = "ASSETS/Characters/Ahri/Skins/Base/Particles/Ahri_Spark.dds"
                birthColor: embed = ValueColor {
                    constantValue: vec4 = { 1, 0.5, 0, 1 }
                    dynamics: pointer = VfxAnimatedColorVariableData {
                        times: list[f32] = {
                            0
                            0.5
                            1
                        }
                        values: list[vec4] = {
                            { 1, 0, 0, 1 }
                            { 0, 1, 0, 1 }
                            { 0, 0, 1, 1 }
                        }
                    }
                }
                color: vec4 = { 0.2, 0.4, 0.6, 1 }
            }
            VfxEmitterDefinitionData {
                lingerColor: embed = ValueColor {
                    dynamics: pointer = VfxAnimatedColorVariableData {
                        times: list[f32] = { 0, 1 }
                        values: list[vec4] = { { 1, 1, 1, 1 }, { 0, 0, 0, 0 } }
                    }
                }
            }
        }
        particleName: string = "Ahri_Q_Orb"
        particlePath: string = "Characters/Ahri/Skins/Skin0/Particles/Ahri_Q_Orb"
    }
    "Characters/Ahri/Skins/Skin0/Particles/Ahri_W_Flame" = VfxSystemDefinitionData {
        complexEmitterDefinitionData: list[pointer] = {
            VfxEmitterDefinitionData {
                emitterName: string = "Flame"
                fresnelColor: vec3 = { 1, 1, 0 }
            }
        }
    }
    "Characters/Ahri/Skins/Skin0/Materials/Orb_Mat" = StaticMaterialDef {
        name: string = "Characters/Ahri/Skins/Skin0/Materials/Orb_Mat"
        paramValues: list2[embed] = {
            StaticMaterialShaderParamDef {
                name: string = "Color_Tint"
                value: vec4 = { 1, 0.8, 0.6, 1 }
            }
            StaticMaterialShaderParamDef {
                name: string = "Scale"
            }
        }
    }
    "Characters/Ahri/Skins/Skin0/Resources" = ResourceResolver {
        resourceMap: map[hash,link] = {
            "Characters/Ahri/Skins/Skin0/Particles/Ahri_Q_Orb" = "Characters/Ahri/Skins/Skin0/Particles/Ahri_Q_Orb"
        }
    }
}
"#;

fn index(text: &str) -> (LineStore, ParsedDocument) {
    let store = LineStore::from_text(text);
    let doc = index_document(&store, &IndexConfig::default());
    (store, doc)
}

#[test]
fn test_catalogs_in_textual_order() {
    let (_, doc) = index(SAMPLE);

    let keys: Vec<&str> = doc.systems().map(|system| system.key()).collect();
    assert_eq!(
        keys,
        vec![ORB, "Characters/Ahri/Skins/Skin0/Particles/Ahri_W_Flame"]
    );

    let orb = doc.system(ORB).unwrap();
    assert_eq!(
        orb.emitters(),
        &[format!("{ORB}__emitter_0"), format!("{ORB}__emitter_1")]
    );
    assert_eq!(orb.display_name(), "Ahri_Q_Orb");
    assert_eq!(orb.particle_path(), Some(ORB));
    assert_eq!(orb.emitter_lists().len(), 1);
    assert_eq!(doc.emitter_count(), 3);
    assert!(doc.diagnostics().is_empty());
}

#[test]
fn test_system_display_name_falls_back_to_key_segment() {
    let (_, doc) = index(SAMPLE);
    let flame = doc
        .system("Characters/Ahri/Skins/Skin0/Particles/Ahri_W_Flame")
        .unwrap();
    assert_eq!(flame.particle_name(), None);
    assert_eq!(flame.display_name(), "Ahri_W_Flame");
}

#[test]
fn test_block_ranges_cover_headers_and_closers() {
    let (store, doc) = index(SAMPLE);
    let orb = doc.system(ORB).unwrap();
    let first = store.line(orb.range().start()).unwrap();
    let last = store.line(orb.range().last().unwrap()).unwrap();
    assert!(first.contains("= VfxSystemDefinitionData {"));
    assert_eq!(last.trim(), "}");

    let spark = doc.find_emitter(ORB, "Spark").unwrap();
    assert!(orb.range().encloses(spark.range()));
    assert_eq!(
        store.line(spark.range().start()).unwrap().trim(),
        "VfxEmitterDefinitionData {"
    );
}

#[test]
fn test_unnamed_emitters_are_not_selectable() {
    let (_, doc) = index(SAMPLE);
    let unnamed = doc.emitter(&format!("{ORB}__emitter_1")).unwrap();
    assert_eq!(unnamed.name(), None);
    assert_eq!(unnamed.display_name(), "Unnamed");
    assert!(doc.find_emitter(ORB, "Unnamed").is_none());
    assert!(doc.find_emitter(ORB, "Missing").is_none());
}

#[test]
fn test_embedded_gradient_coordinates() {
    let (store, doc) = index(SAMPLE);
    let spark = doc.find_emitter(ORB, "Spark").unwrap();
    let birth = spark.color(ColorField::Birth).unwrap();

    let constant = birth.constant().unwrap();
    assert!(
        store
            .line(constant.coord().line())
            .unwrap()
            .contains("constantValue: vec4 = { 1, 0.5, 0, 1 }")
    );

    let times: Vec<f32> = birth.stops().iter().map(|stop| stop.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);
    let green = &birth.stops()[1].value;
    assert_eq!(green.color().components(), [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(
        store.line(green.coord().line()).unwrap().trim(),
        "{ 0, 1, 0, 1 }"
    );
    assert_eq!(birth.entries().len(), 4);
    assert_eq!(birth.time_range(), (0.0, 1.0));
}

#[test]
fn test_inline_color_property() {
    let (store, doc) = index(SAMPLE);
    let spark = doc.find_emitter(ORB, "Spark").unwrap();
    let base = spark.color(ColorField::Base).unwrap();
    let inline = base.inline().unwrap();
    assert!(!base.is_gradient());
    assert_eq!(inline.width(), 4);
    assert!(
        store
            .line(inline.coord().line())
            .unwrap()
            .contains("color: vec4")
    );

    let flame = doc
        .find_emitter("Characters/Ahri/Skins/Skin0/Particles/Ahri_W_Flame", "Flame")
        .unwrap();
    let fresnel = flame.color(ColorField::Fresnel).unwrap();
    assert_eq!(fresnel.inline().unwrap().width(), 3);
}

#[test]
fn test_single_line_lists_use_slots() {
    let (_, doc) = index(SAMPLE);
    let unnamed = doc.emitter(&format!("{ORB}__emitter_1")).unwrap();
    let linger = unnamed.color(ColorField::Linger).unwrap();
    assert_eq!(linger.stops().len(), 2);
    let first = linger.stops()[0].value.coord();
    let second = linger.stops()[1].value.coord();
    assert_eq!(first.line(), second.line());
    assert_eq!((first.slot(), second.slot()), (0, 1));
    assert_eq!(linger.stops()[1].time, 1.0);
}

#[test]
fn test_blend_mode_and_assets() {
    let (store, doc) = index(SAMPLE);
    let spark = doc.find_emitter(ORB, "Spark").unwrap();

    let blend = spark.blend_mode().unwrap();
    assert_eq!(blend.value(), 1);
    assert!(store.line(blend.line()).unwrap().contains("blendMode"));

    assert_eq!(spark.assets().len(), 1);
    assert_eq!(spark.assets()[0].filename(), "Ahri_Spark.dds");
    assert!(!spark.is_randomizer());
}

#[test]
fn test_materials_keep_vec4_params_only() {
    let (_, doc) = index(SAMPLE);
    let material = doc
        .material("Characters/Ahri/Skins/Skin0/Materials/Orb_Mat")
        .unwrap();
    assert_eq!(
        material.name(),
        Some("Characters/Ahri/Skins/Skin0/Materials/Orb_Mat")
    );
    assert_eq!(material.params().len(), 1);
    assert_eq!(material.params()[0].name(), "Color_Tint");
    assert_eq!(
        material.params()[0].value().color().components(),
        [1.0, 0.8, 0.6, 1.0]
    );
}

#[test]
fn test_resource_map_and_registration() {
    let (store, doc) = index(SAMPLE);
    let map = doc.resource_map().unwrap();
    assert_eq!(map.entries().len(), 1);
    assert_eq!(map.entry_indent(), Some("            "));
    assert_eq!(store.line(map.close_line()).unwrap(), "        }");
    assert!(map.contains_key(&ORB.to_ascii_uppercase()));

    let unregistered: Vec<&str> = doc
        .unregistered_systems()
        .iter()
        .map(|system| system.key())
        .collect();
    assert_eq!(
        unregistered,
        vec!["Characters/Ahri/Skins/Skin0/Particles/Ahri_W_Flame"]
    );
}

#[test]
fn test_has_key_checks_entries_systems_and_map() {
    let (_, doc) = index(SAMPLE);
    assert!(doc.has_key(ORB));
    assert!(doc.has_key("characters/ahri/skins/skin0/resources"));
    assert!(doc.has_key("Characters/Ahri/Skins/Skin0/Materials/Orb_Mat"));
    assert!(!doc.has_key(&format!("{ORB}_fire")));
}

#[test]
fn test_randomizer_children() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            childrenProbability: embed = ValueFloat {
                constantValue: f32 = 2
            }
            childParticleSetDefinition: pointer = VfxChildParticleSetDefinitionData {
                childrenIdentifiers: list[embed] = {
                    VfxChildIdentifier {
                        effect: link = "a/b_fire"
                    }
                    VfxChildIdentifier { effect: link = "a/b_ice" }
                }
            }
            isSingleParticle: flag = true
            emitterName: string = "Spark_randomized"
        }
    }
}"#;
    let (_, doc) = index(text);
    let randomizer = doc.find_emitter("a/b", "Spark_randomized").unwrap();
    assert!(randomizer.is_single_particle());
    assert!(randomizer.is_randomizer());
    assert_eq!(randomizer.children(), &["a/b_fire", "a/b_ice"]);
}

#[test]
fn test_spawners_are_not_randomizers() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            emitterName: string = "Spark"
            isSingleParticle: flag = true
            childParticleSetDefinition: pointer = VfxChildParticleSetDefinitionData {
                childrenIdentifiers: list[embed] = {
                    VfxChildIdentifier { effect: link = "c/d" }
                }
            }
        }
        VfxEmitterDefinitionData {
            emitterName: string = "Old_randomized"
            childParticleSetDefinition: pointer = VfxChildParticleSetDefinitionData {
                childrenIdentifiers: list[embed] = {
                    VfxChildIdentifier { effect: link = "c/d" }
                }
            }
        }
    }
}"#;
    let (_, doc) = index(text);
    let spark = doc.find_emitter("a/b", "Spark").unwrap();
    assert_eq!(spark.children(), &["c/d"]);
    assert!(spark.is_single_particle());
    assert!(!spark.is_randomizer());
    assert!(!doc.find_emitter("a/b", "Old_randomized").unwrap().is_randomizer());
}

#[test]
fn test_single_line_emitter_keeps_its_name() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData { emitterName: string = "Flash" }
        VfxEmitterDefinitionData {
            emitterName: string = "Glow"
        }
    }
}"#;
    let (_, doc) = index(text);
    let names: Vec<&str> = doc
        .emitters_of("a/b")
        .map(|emitter| emitter.display_name())
        .collect();
    assert_eq!(names, vec!["Flash", "Glow"]);
    let flash = doc.find_emitter("a/b", "Flash").unwrap();
    assert_eq!(flash.range().len(), 1);
    assert!(doc.diagnostics().is_empty());
}

#[test]
fn test_unclosed_system_is_discarded_with_warning() {
    let text = r#""a/ok" = VfxSystemDefinitionData {
    particleName: string = "ok"
}
"a/broken" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            emitterName: string = "Lost"
        }
    }
"#;
    let (_, doc) = index(text);
    assert!(doc.system("a/ok").is_some());
    assert!(doc.system("a/broken").is_none());
    assert_eq!(doc.emitter_count(), 0);

    let warning = &doc.diagnostics()[0];
    assert_eq!(warning.severity(), Severity::Warning);
    assert_eq!(warning.code(), Some(ErrorCode::E001));
    assert!(warning.message().contains("a/broken"));
}

#[test]
fn test_stray_closer_is_clamped() {
    let text = "}\n\"a/b\" = VfxSystemDefinitionData {\n}\n";
    let (_, doc) = index(text);
    assert_eq!(doc.diagnostics().len(), 1);
    assert_eq!(doc.diagnostics()[0].code(), Some(ErrorCode::E002));
    assert!(doc.system("a/b").is_some());
}

#[test]
fn test_mismatched_gradient_warns() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            color: embed = ValueColor {
                dynamics: pointer = VfxAnimatedColorVariableData {
                    times: list[f32] = { 0 }
                    values: list[vec4] = { { 1, 0, 0, 1 }, { 0, 0, 1, 1 } }
                }
            }
        }
    }
}"#;
    let (_, doc) = index(text);
    assert_eq!(doc.diagnostics()[0].code(), Some(ErrorCode::E101));
    let emitter = doc.emitter("a/b__emitter_0").unwrap();
    assert_eq!(emitter.color(ColorField::Base).unwrap().stops().len(), 1);
}

#[test]
fn test_missing_times_are_spread_evenly() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            color: embed = ValueColor {
                dynamics: pointer = VfxAnimatedColorVariableData {
                    values: list[vec4] = {
                        { 1, 0, 0, 1 }
                        { 0, 1, 0, 1 }
                        { 0, 0, 1, 1 }
                    }
                }
            }
        }
    }
}"#;
    let (_, doc) = index(text);
    let emitter = doc.emitter("a/b__emitter_0").unwrap();
    let times: Vec<f32> = emitter
        .color(ColorField::Base)
        .unwrap()
        .stops()
        .iter()
        .map(|stop| stop.time)
        .collect();
    assert_eq!(times, vec![0.0, 0.5, 1.0]);
}

#[test]
fn test_braces_in_strings_by_scan_mode() {
    let text = r#""a/b" = VfxSystemDefinitionData {
    complexEmitterDefinitionData: list[pointer] = {
        VfxEmitterDefinitionData {
            emitterName: string = "odd {"
        }
    }
}"#;
    let store = LineStore::from_text(text);

    let aware = index_document(&store, &IndexConfig::default());
    assert!(aware.find_emitter("a/b", "odd {").is_some());
    assert!(aware.diagnostics().is_empty());

    let naive = index_document(
        &store,
        &IndexConfig::default().with_scan_mode(ScanMode::Naive),
    );
    assert!(naive.system("a/b").is_none());
    assert_eq!(naive.diagnostics()[0].code(), Some(ErrorCode::E001));
}

#[test]
fn test_crlf_input_indexes_like_lf() {
    let crlf = SAMPLE.replace('\n', "\r\n");
    let (_, lf_doc) = index(SAMPLE);
    let (_, crlf_doc) = index(&crlf);
    assert_eq!(lf_doc.system_count(), crlf_doc.system_count());
    assert_eq!(lf_doc.emitter_count(), crlf_doc.emitter_count());
    let spark = crlf_doc.find_emitter(ORB, "Spark").unwrap();
    assert_eq!(spark.colors().len(), 2);
    assert_eq!(
        crlf_doc.resource_map().unwrap().entries(),
        lf_doc.resource_map().unwrap().entries()
    );
}
