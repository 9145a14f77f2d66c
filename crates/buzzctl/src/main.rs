//! Command-line exerciser: buzz the configured pin for a fixed duration,
//! or until Enter is pressed when the duration is 0.

use std::env;
use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use buzzer_core::BuzzerController;
use buzzer_core::config::ConfigLoader;
use buzzer_core::controller::DURATION_KEEP;
use buzzer_sysfs::SysfsGpio;

mod console_log;

fn main() -> Result<()> {
    console_log::init(log::LevelFilter::Debug);

    let mut args = env::args().skip(1);
    let (config_path, duration) = match (args.next(), args.next()) {
        (Some(path), Some(secs)) => {
            let secs: u64 = secs
                .parse()
                .context("duration must be a number of seconds")?;
            (path, secs)
        }
        _ => bail!("usage: buzzctl <config-path> <duration-secs>  (0 buzzes until Enter)"),
    };

    let mut buzzer = BuzzerController::new(SysfsGpio::new(), ConfigLoader::new(&config_path));
    buzzer.init().context("buzzer init failed")?;
    buzzer.play(duration).context("buzzer play failed")?;

    if duration == DURATION_KEEP {
        log::info!("buzzing until Enter is pressed");
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        buzzer.stop().context("buzzer stop failed")?;
    } else {
        log::info!("buzzing for {duration}s");
        while buzzer.is_playing() {
            thread::sleep(Duration::from_millis(200));
        }
    }
    Ok(())
}
