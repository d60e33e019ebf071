// Print-mode rendering of a classification

use serde::Serialize;

use crate::error::FdsResult;
use crate::format::HeaderKind;
use crate::image::Classification;

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Human-readable report, one fact per line
pub fn render_text(cls: &Classification) -> String {
    let mut lines = vec![
        format!("Disk count: {}", cls.disk_count),
        format!("FDS header expected: {}", yes_no(cls.has_header.is_present())),
    ];

    if cls.has_header.is_present() {
        lines.push(format!("FDS header valid: {}", yes_no(cls.header_valid)));
    }
    lines.push(format!("Image header valid: {}", yes_no(cls.leader_valid)));

    // Game info is garbage unless the leader matched
    if cls.leader_valid {
        lines.push(format!("Game vendor id: {}", cls.vendor_id));
        lines.push(format!("Game ident: \"{}\"", cls.ident_text()));
        lines.push(format!("Game version: {}", cls.game_version));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[derive(Debug, Serialize)]
struct JsonReport {
    disk_count: u8,
    has_header: HeaderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_valid: Option<bool>,
    leader_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    game: Option<GameInfo>,
}

#[derive(Debug, Serialize)]
struct GameInfo {
    vendor_id: u8,
    ident: String,
    version: u8,
}

/// JSON report with the same conditional fields as the text form
pub fn render_json(cls: &Classification) -> FdsResult<String> {
    let report = JsonReport {
        disk_count: cls.disk_count,
        has_header: cls.has_header,
        header_valid: cls.has_header.is_present().then_some(cls.header_valid),
        leader_valid: cls.leader_valid,
        game: cls.leader_valid.then(|| GameInfo {
            vendor_id: cls.vendor_id,
            ident: cls.ident_text(),
            version: cls.game_version,
        }),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
