use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::error::Error;
use tracing::warn;

static ASSETS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Short reminders rotated on the session screen.
#[derive(Deserialize, Clone, Debug)]
pub struct TipSet {
    pub name: String,
    pub tips: Vec<String>,
}

impl TipSet {
    pub fn builtin() -> Self {
        match read_tips_from_file("tips.json") {
            Ok(set) => set,
            Err(err) => {
                warn!(%err, "bundled tips unavailable");
                Self {
                    name: "empty".to_string(),
                    tips: Vec::new(),
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tips.get(index).map(String::as_str)
    }
}

fn read_tips_from_file(file_name: &str) -> Result<TipSet, Box<dyn Error>> {
    let file = ASSETS_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("{file_name} is not bundled"))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| format!("{file_name} is not utf-8"))?;
    Ok(serde_json::from_str(contents)?)
}
