//! Response assembly

use sqlrender_core::{File, GenerateResponse};

/// Wrap rendered bytes as the single file of a response
///
/// The name is used verbatim, empty included; persisting the file is the
/// caller's job.
pub fn assemble(filename: impl Into<String>, contents: Vec<u8>) -> GenerateResponse {
    let mut response = GenerateResponse::new();
    response.push_file(File::new(filename, contents));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_named_file() {
        let response = assemble("queries.rs", b"pub const A: &str = \"\";\n".to_vec());

        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].name, "queries.rs");
        assert_eq!(response.files[0].contents, b"pub const A: &str = \"\";\n");
    }

    #[test]
    fn empty_filename_passes_through() {
        let response = assemble("", Vec::new());
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.files[0].name, "");
        assert!(response.files[0].contents.is_empty());
    }
}
