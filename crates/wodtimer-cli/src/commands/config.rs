use clap::Subcommand;
use wodtimer_core::Preferences;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current preferences as TOML
    Show,
    /// Update preferences
    Set {
        /// Enable or disable sound cues
        #[arg(long)]
        sound: Option<bool>,
        /// Cue volume (0-100)
        #[arg(long)]
        volume: Option<u32>,
        /// Countdown seconds before the clock starts (0 disables)
        #[arg(long)]
        countdown: Option<u32>,
    },
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let prefs = Preferences::load()?;
            print!("{}", toml::to_string_pretty(&prefs)?);
        }
        ConfigAction::Set {
            sound,
            volume,
            countdown,
        } => {
            let mut prefs = Preferences::load()?;
            if let Some(sound) = sound {
                prefs.sound.enabled = sound;
            }
            if let Some(volume) = volume {
                prefs.sound.volume = volume.min(100);
            }
            if let Some(countdown) = countdown {
                prefs.countdown_secs = countdown;
            }
            prefs.save()?;
            print!("{}", toml::to_string_pretty(&prefs)?);
        }
    }
    Ok(())
}
