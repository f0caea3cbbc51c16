use crate::core::config::data::{path_display, Config};
use crate::utils::url::DEFAULT_ENDPOINT;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.endpoint {
            Some(endpoint) => println!("  endpoint: {endpoint}"),
            None => println!("  endpoint: (unset, using {DEFAULT_ENDPOINT})"),
        }
        match &self.data_dir {
            Some(dir) => println!("  data-dir: {}", path_display(dir)),
            None => println!("  data-dir: (unset)"),
        }
    }
}
