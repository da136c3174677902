use std::time::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct TimerSpan {
    name: String,
    started_at: Instant,
}

/// Measures nested steps of a long-running job and logs how long each one took. Call `done` at
/// the end to log a summary of every step.
pub struct Timer {
    outermost_name: String,
    stack: Vec<TimerSpan>,
    results: Vec<String>,
}

impl Timer {
    pub fn new<I: AsRef<str>>(name: I) -> Timer {
        let mut t = Timer {
            outermost_name: name.as_ref().to_string(),
            stack: Vec::new(),
            results: Vec::new(),
        };
        t.start(name);
        t
    }

    pub fn start<I: AsRef<str>>(&mut self, name: I) {
        let name = name.as_ref();
        info!("{}{}...", self.indent(), name);
        self.stack.push(TimerSpan {
            name: name.to_string(),
            started_at: Instant::now(),
        });
    }

    /// Panics if `name` isn't the innermost running step.
    pub fn stop<I: AsRef<str>>(&mut self, name: I) {
        let name = name.as_ref();
        let span = match self.stack.pop() {
            Some(span) => span,
            None => panic!("stop({}) called with nothing running", name),
        };
        if span.name != name {
            panic!("stop({}) called while {} is running", name, span.name);
        }
        let line = format!(
            "{}{} took {}",
            self.indent(),
            span.name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );
        info!("{}", line);
        self.results.push(line);
    }

    /// Stops the outermost step and logs every result.
    pub fn done(mut self) {
        let name = self.outermost_name.clone();
        self.stop(&name);
        if !self.stack.is_empty() {
            warn!("{} finished with steps still running", name);
        }
        info!("");
        for line in &self.results {
            info!("{}", line);
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.stack.len())
    }
}
