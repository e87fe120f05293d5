use anyhow::anyhow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Work,
    Break,
}

impl Mode {
    pub fn default_minutes(self) -> u8 {
        match self {
            Self::Work => 25,
            Self::Break => 5,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Work => Self::Break,
            Self::Break => Self::Work,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "break" => Ok(Self::Break),
            other => Err(anyhow!("expected 'work' or 'break', got: {other}")),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Work => write!(f, "work"),
            Self::Break => write!(f, "break"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not active; nothing moved.
    Idle,
    /// One second elapsed.
    Running,
    /// The session hit zero. Carries the mode that finished; the timer has
    /// already flipped to the other mode at its default duration and
    /// deactivated itself.
    Completed(Mode),
}

/// Countdown state machine. Deliberately not persisted; a session lives
/// and dies with the invocation driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pomodoro {
    pub mode: Mode,
    pub minutes: u8,
    pub seconds: u8,
    pub active: bool,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(Mode::Work)
    }
}

impl Pomodoro {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            minutes: mode.default_minutes(),
            seconds: 0,
            active: false,
        }
    }

    /// Advances one second while active. At 00:00 the session completes:
    /// work flips to a 5 minute break, break flips to a 25 minute work
    /// session, and the countdown stops.
    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }

        if self.seconds > 0 {
            self.seconds -= 1;
            Tick::Running
        } else if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = 59;
            Tick::Running
        } else {
            let finished = self.mode;
            self.mode = finished.next();
            self.minutes = self.mode.default_minutes();
            self.seconds = 0;
            self.active = false;
            Tick::Completed(finished)
        }
    }

    /// Start/pause toggle; returns the new active state.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Cancels any running countdown and reloads the current mode's
    /// default duration without completing it.
    pub fn reset(&mut self) {
        self.active = false;
        self.minutes = self.mode.default_minutes();
        self.seconds = 0;
    }

    /// Cancels any running countdown and switches to `mode` at its default
    /// duration.
    pub fn switch(&mut self, mode: Mode) {
        self.active = false;
        self.mode = mode;
        self.minutes = mode.default_minutes();
        self.seconds = 0;
    }

    pub fn remaining(&self) -> String {
        format!("{:02}:{:02}", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(mode: Mode, minutes: u8, seconds: u8) -> Pomodoro {
        Pomodoro {
            mode,
            minutes,
            seconds,
            active: true,
        }
    }

    #[test]
    fn inactive_timer_does_not_move() {
        let mut timer = Pomodoro::default();
        assert_eq!(timer.tick(), Tick::Idle);
        assert_eq!(timer.remaining(), "25:00");
    }

    #[test]
    fn seconds_count_down() {
        let mut timer = at(Mode::Work, 0, 5);
        assert_eq!(timer.tick(), Tick::Running);
        assert_eq!(timer.remaining(), "00:04");
    }

    #[test]
    fn minute_boundary_borrows() {
        let mut timer = at(Mode::Work, 1, 0);
        assert_eq!(timer.tick(), Tick::Running);
        assert_eq!(timer.remaining(), "00:59");
    }

    #[test]
    fn work_completion_switches_to_break() {
        let mut timer = at(Mode::Work, 0, 0);
        assert_eq!(timer.tick(), Tick::Completed(Mode::Work));
        assert_eq!(timer.mode, Mode::Break);
        assert_eq!(timer.remaining(), "05:00");
        assert!(!timer.active);
    }

    #[test]
    fn break_completion_switches_to_work() {
        let mut timer = at(Mode::Break, 0, 0);
        assert_eq!(timer.tick(), Tick::Completed(Mode::Break));
        assert_eq!(timer.mode, Mode::Work);
        assert_eq!(timer.remaining(), "25:00");
    }

    #[test]
    fn reset_cancels_without_completing() {
        let mut timer = at(Mode::Break, 0, 3);
        timer.reset();
        assert!(!timer.active);
        assert_eq!(timer.mode, Mode::Break);
        assert_eq!(timer.remaining(), "05:00");
    }

    #[test]
    fn switch_cancels_and_loads_default() {
        let mut timer = at(Mode::Work, 12, 34);
        timer.switch(Mode::Break);
        assert!(!timer.active);
        assert_eq!(timer.remaining(), "05:00");
    }

    #[test]
    fn toggle_flips_active() {
        let mut timer = Pomodoro::default();
        assert!(timer.toggle());
        assert!(!timer.toggle());
    }

    #[test]
    fn full_session_runs_to_completion() {
        let mut timer = at(Mode::Work, 0, 2);
        let mut ticks = 0;
        loop {
            match timer.tick() {
                Tick::Running => ticks += 1,
                Tick::Completed(Mode::Work) => break,
                other => panic!("unexpected tick result: {other:?}"),
            }
        }
        assert_eq!(ticks, 2);
        assert_eq!(timer.mode, Mode::Break);
    }
}
