//! Log rendering helpers shared by the unit tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 10, 15)
        .and_then(|d| d.and_hms_opt(20, 0, 0))
        .unwrap()
}

/// Identity token for account `STEAM_0:0:<account>`.
pub fn player(name: &str, uid: u32, account: u32, team: &str) -> String {
    format!("\"{name}<{uid}><STEAM_0:0:{account}><{team}>\"")
}

/// One log line `secs` after [`base_time`].
pub fn line(secs: i64, content: &str) -> String {
    let ts = base_time() + Duration::seconds(secs);
    format!("L {}: {}", ts.format("%m/%d/%Y - %H:%M:%S"), content)
}

#[derive(Debug, Default)]
pub struct LogBuilder {
    lines: Vec<String>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, secs: i64, content: impl AsRef<str>) -> Self {
        self.lines.push(line(secs, content.as_ref()));
        self
    }

    pub fn raw(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
