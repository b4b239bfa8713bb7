//! Request parsing helpers
//!
//! Normalizes the pieces of a request that arrive in browser-specific
//! shapes before they reach the core.

/// Reduces a client-supplied upload file name to its last segment.
///
/// Some browsers send the full local path (`C:\Users\me\report.pdf`).
pub fn sanitize_upload_name(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// ASCII-only file name for the `Content-Disposition` header.
pub fn attachment_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim().is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_upload_name() {
        assert_eq!(sanitize_upload_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_upload_name("C:\\Users\\me\\report.pdf"), "report.pdf");
        assert_eq!(sanitize_upload_name("/home/me/report.pdf"), "report.pdf");
        assert_eq!(sanitize_upload_name("dir/"), "");
    }

    #[test]
    fn test_attachment_name() {
        assert_eq!(attachment_name("my file.txt"), "my file.txt");
        assert_eq!(attachment_name("quote\".txt"), "quote_.txt");
        assert_eq!(attachment_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(attachment_name(""), "download");
    }
}
