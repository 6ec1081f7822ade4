use parley::ModelInfo;

/// Human-readable byte count, e.g. `637 MB` or `1.50 GB`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.0} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.0} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

pub fn model_line(model: &ModelInfo) -> String {
    match (&model.display_name, model.size) {
        (Some(display), _) => format!("{} ({display})", model.name),
        (None, Some(size)) => format!("{} ({})", model.name, format_size(size)),
        (None, None) => model.name.clone(),
    }
}

/// Body of the first fenced code block, or the whole reply when unfenced.
pub fn extract_code(reply: &str) -> &str {
    let Some(open) = reply.find("```") else {
        return reply.trim();
    };
    let after_fence = &reply[open + 3..];
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(after_fence.len());
    let body = &after_fence[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim_end(),
        None => body.trim_end(),
    }
}
