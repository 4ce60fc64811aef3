pub mod app;
pub mod audio;
pub mod picker;
pub mod picker_ui;
pub mod ui;

use std::error::Error;
use std::path::Path;

pub fn run(file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    // Always launch the TUI; a file given on the command line starts playing
    app::run_with_file(file)
}
