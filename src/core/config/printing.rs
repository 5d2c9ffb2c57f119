use crate::core::config::data::{path_display, Config};

fn describe(value: Option<&str>, effective: &str) -> String {
    match value {
        Some(value) => value.to_string(),
        None => format!("{effective} (default)"),
    }
}

impl Config {
    /// Effective settings, one `key: value` per line.
    pub fn describe_lines(&self) -> Vec<String> {
        let memory_file = path_display(self.memory_file_path());
        let autoreply = if self.autoreply_enabled() { "on" } else { "off" };

        vec![
            format!(
                "base-url: {}",
                describe(self.base_url.as_deref(), self.base_url())
            ),
            format!("model: {}", describe(self.model.as_deref(), self.model())),
            match &self.memory_file {
                Some(_) => format!("memory-file: {memory_file}"),
                None => format!("memory-file: {memory_file} (default)"),
            },
            match self.autoreply {
                Some(_) => format!("autoreply: {autoreply}"),
                None => format!("autoreply: {autoreply} (default)"),
            },
            format!(
                "greeting: {}",
                describe(self.greeting.as_deref(), self.greeting())
            ),
            format!(
                "system-instruction: {}",
                describe(
                    self.system_instruction.as_deref(),
                    self.system_instruction()
                )
            ),
        ]
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match Self::config_path() {
            Some(path) => println!("  config file: {}", path_display(path)),
            None => println!("  config file: (unavailable on this platform)"),
        }
        for line in self.describe_lines() {
            println!("  {line}");
        }
    }
}
