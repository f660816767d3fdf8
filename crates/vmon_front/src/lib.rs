//! The terminal front of the monitor. Reads command lines from standard input and runs the demo
//! machine whenever a command asks it to continue.

#[macro_use]
extern crate log;

mod config;
mod machine;
mod observer;

pub use config::{Config, ConfigError, ObserverFormat};
pub use machine::{Machine, StopReason};
pub use observer::{BinaryObserver, JsonObserver};

use vmon_core::{Monitor, Resume};

use std::fs::File;
use std::io::{self, BufRead, Write};

fn open_observer(mon: &mut Monitor, config: &Config) {
    let Some(path) = &config.observer_log else {
        return;
    };
    match File::create(path) {
        Ok(file) => {
            info!("writing checkpoint hits to {}", path.display());
            let out = Box::new(file);
            match config.observer_format {
                ObserverFormat::Json => mon.set_observer(Box::new(JsonObserver::new(out))),
                ObserverFormat::Binary => mon.set_observer(Box::new(BinaryObserver::new(out))),
            }
        }
        Err(err) => error!("failed to create observer log {}: {err}", path.display()),
    }
}

pub fn run(config: Config) {
    let mut machine = Machine::with_demo();
    let mut mon = Monitor::new(Box::new(io::stdout()), config.settings());
    open_observer(&mut mon, &config);

    if let Some(path) = &config.startup {
        mon.playback(&mut machine, &path.to_string_lossy());
    }

    mon.show_position(&machine);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", mon.prompt(&machine));
        if let Err(err) = io::stdout().flush() {
            warn!("failed to flush prompt: {err}");
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                error!("failed to read command: {err}");
                break;
            }
            None => break,
        };
        mon.execute_line(&mut machine, line.trim_end());
        let resume = match mon.take_resume() {
            Some(Resume::Quit) => break,
            Some(resume) => resume,
            None => continue,
        };
        let reason = machine.run(&mut mon, resume);
        debug!("machine stopped: {reason:?}");
        match reason {
            StopReason::Quit => break,
            StopReason::Limit => println!("Still running, entering monitor"),
            StopReason::Break => println!("BRK instruction reached"),
            _ => (),
        }
        mon.show_position(&machine);
    }
}
