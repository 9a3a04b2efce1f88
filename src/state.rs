#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckResults {
    pub cpu: bool,
    pub memory: bool,
    pub disk: bool,
    pub processes: bool,
}

impl CheckResults {
    pub fn all_healthy(&self) -> bool {
        self.cpu && self.memory && self.disk && self.processes
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed { all_healthy: bool },
    Interrupted,
    Failed(crate::monitor::MonitorError),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { all_healthy: true } | Self::Interrupted => 0,
            Self::Completed { all_healthy: false } | Self::Failed(_) => 1,
        }
    }
}
