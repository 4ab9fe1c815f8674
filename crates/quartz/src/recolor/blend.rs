use log::debug;

use quartz_parser::error::{Diagnostic, ErrorCode};

use crate::Document;

/// Rewrite the `blendMode` value of one emitter in place.
///
/// The emitter is addressed by its synthetic key; the stored line
/// coordinate is used directly, so no re-indexing happens.
pub fn set_blend_mode(doc: &mut Document, emitter_key: &str, value: u8) -> Result<(), Diagnostic> {
    let (lines, index) = doc.parts_mut();
    let Some(emitter) = index.emitter_mut(emitter_key) else {
        return Err(Diagnostic::error(format!("unknown emitter `{emitter_key}`"))
            .with_code(ErrorCode::E201));
    };
    let name = emitter.display_name().to_string();
    let Some(blend) = emitter.blend_mode_mut() else {
        return Err(
            Diagnostic::error(format!("emitter `{name}` has no `blendMode` field"))
                .with_code(ErrorCode::E204)
                .with_help("only existing blend modes can be changed"),
        );
    };

    lines
        .write_field_value(blend.line(), &value.to_string())
        .map_err(|err| Diagnostic::error(err.to_string()).with_code(ErrorCode::E303))?;
    debug!(emitter = name.as_str(), from = blend.value(), to = value; "Blend mode updated");
    blend.set_value(value);
    Ok(())
}
