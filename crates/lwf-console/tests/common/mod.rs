use std::io::Write;

use tempfile::NamedTempFile;

pub const TABLE: &str = r#"{
    "routes": [
        { "name": "home", "path": "/" },
        {
            "name": "post_show",
            "path": "/posts/{id}",
            "methods": ["GET"],
            "requirements": { "id": "\\d+" }
        },
        {
            "name": "admin",
            "path": "/admin/{section}",
            "host": "admin.example.com",
            "schemes": ["https"],
            "defaults": { "section": "dashboard" },
            "requirements": { "_roles": "admin" }
        }
    ]
}"#;

/// Writes the sample table to a temporary file.
pub fn table_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TABLE.as_bytes()).unwrap();
    file
}
