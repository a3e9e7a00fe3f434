//! Text-to-speech through a system command such as `spd-say`

use std::path::Path;

use tokio::process::Command;

use crate::error::Error;

/// Language tag used when speaking the English caption
pub const CAPTION_LANG: &str = "en-US";

/// Check whether `name` resolves to an executable file
fn command_exists(name: &str) -> bool {
    if name.contains('/') {
        return Path::new(name).is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}

/// Speak `text` in `lang` and wait for the command to exit
///
/// The child is awaited on the runtime, so other tasks keep running while
/// it talks. A missing or failing speech command is reported as
/// [`Error::MediaDeviceUnavailable`].
pub async fn speak(command: &str, text: &str, lang: &str) -> Result<(), Error> {
    if !command_exists(command) {
        return Err(Error::MediaDeviceUnavailable(format!(
            "speech command '{command}' not found"
        )));
    }

    // spd-say takes a bare language code
    let code = lang.split('-').next().unwrap_or(lang);
    log::info!("Speaking {} characters ({lang})", text.chars().count());
    let status = Command::new(command)
        .args(["--wait", "-l", code, "--"])
        .arg(text)
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| Error::MediaDeviceUnavailable(format!("{command}: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::MediaDeviceUnavailable(format!(
            "{command} exited with {status}"
        )))
    }
}
