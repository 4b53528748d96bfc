#![allow(dead_code)]

use std::sync::Mutex;

use jet_sql_driver::{Command, DriverConfig, JetDriver, NativeDriver};

/// A native driver that records every command it is asked to create.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub commands: Mutex<Vec<Command>>,
    pub refuse: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("native driver refused the command")]
pub struct Refused;

impl NativeDriver for RecordingDriver {
    type Command = Command;
    type Error = Refused;

    fn create_command(&self, command: Command) -> Result<Command, Refused> {
        if self.refuse {
            return Err(Refused);
        }
        self.commands.lock().unwrap().push(command.clone());
        Ok(command)
    }
}

pub fn driver() -> JetDriver<RecordingDriver> {
    JetDriver::new(RecordingDriver::default(), &DriverConfig::default())
}

pub fn driver_with(config: &DriverConfig) -> JetDriver<RecordingDriver> {
    JetDriver::new(RecordingDriver::default(), config)
}
