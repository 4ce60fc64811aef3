use std::error::Error;
use std::path::Path;

pub fn handle_play(file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "player")]
    {
        bounce_player::player::run(file)
    }

    #[cfg(not(feature = "player"))]
    {
        let _ = file;
        use owo_colors::OwoColorize;
        println!("{} {}", "🎵".cyan(), "Bounce Player".bold());
        println!();
        println!(
            "{} Playback requires the 'player' feature to be enabled.",
            "Note:".yellow()
        );
        println!();
        println!("To enable it, build with:");
        println!("  {}", "cargo build --release --features player".cyan());

        Ok(())
    }
}
