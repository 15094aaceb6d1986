use std::{
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    process::{ChildStdout, Command, Stdio},
};

use thiserror::Error;

use crate::sim::Simulation;

const NORMAL_TERMINATION: &str = "normal termination";

#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not launch `{exe}`")]
    Launch {
        exe: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output error")]
    Io(#[from] std::io::Error),
    #[error("MODFLOW 6 did not terminate normally (exit code {code:?})")]
    AbnormalTermination { code: Option<i32> },
}

pub struct ObsCtx<'ctx> {
    sim: &'ctx Simulation,
    line_number: usize,
    line: &'ctx str,
}

impl<'ctx> ObsCtx<'ctx> {
    pub fn simulation(&self) -> &Simulation {
        self.sim
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line(&self) -> &str {
        self.line
    }
}

#[allow(unused_variables)]
pub trait Observer {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), RunError> {
        Ok(())
    }

    fn at_each_line(&mut self, ctx: ObsCtx) -> Result<(), RunError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx, report: &RunReport) -> Result<(), RunError> {
        Ok(())
    }
}

/// Outcome of one engine run: the success flag and the captured output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub buffer: Vec<String>,
}

impl RunReport {
    /// Turns an unsuccessful run into an error.
    pub fn check(self) -> Result<Self, RunError> {
        if self.success {
            Ok(self)
        } else {
            Err(RunError::AbnormalTermination {
                code: self.exit_code,
            })
        }
    }
}

pub struct Driver<'sim, 'd> {
    sim: &'sim Simulation,
    exe: PathBuf,
    args: Vec<String>,
    observers: Vec<Box<dyn Observer + 'd>>,
}

impl<'sim, 'd> Driver<'sim, 'd> {
    pub fn new(sim: &'sim Simulation) -> Self {
        Self {
            sim,
            exe: sim.exe().to_path_buf(),
            args: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_exe(mut self, exe: impl AsRef<Path>) -> Self {
        self.exe = exe.as_ref().to_path_buf();
        self
    }

    /// Extra command-line argument, e.g. an explicit simulation namefile.
    pub fn with_arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn with_observer(mut self, observer: impl Observer + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    fn ctx<'a>(&'a self, line_number: usize, line: &'a str) -> ObsCtx<'a> {
        ObsCtx {
            sim: self.sim,
            line_number,
            line,
        }
    }

    /// Runs the engine inside the simulation workspace until it exits.
    pub fn run(&mut self) -> Result<RunReport, RunError> {
        let mut observers = std::mem::take(&mut self.observers);
        let result = self.run_with(&mut observers);
        self.observers = observers;
        result
    }

    fn run_with(&self, observers: &mut [Box<dyn Observer + 'd>]) -> Result<RunReport, RunError> {
        for o in observers.iter_mut() {
            o.at_startup(self.ctx(0, ""))?;
        }

        let mut child = Command::new(&self.exe)
            .args(&self.args)
            .current_dir(self.sim.workspace())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| RunError::Launch {
                exe: self.exe.clone(),
                source,
            })?;

        let mut buffer = Vec::new();
        let mut terminated_normally = false;
        if let Some(stdout) = child.stdout.take() {
            let streamed = self.stream(stdout, observers, &mut buffer, &mut terminated_normally);
            if let Err(e) = streamed {
                // stop and reap the engine before reporting
                child.kill().ok();
                child.wait().ok();
                return Err(e);
            }
        }

        let status = child.wait()?;
        let report = RunReport {
            success: status.success() && terminated_normally,
            exit_code: status.code(),
            buffer,
        };

        for o in observers.iter_mut() {
            o.at_cleanup(self.ctx(report.buffer.len(), ""), &report)?;
        }

        Ok(report)
    }

    fn stream(
        &self,
        stdout: ChildStdout,
        observers: &mut [Box<dyn Observer + 'd>],
        buffer: &mut Vec<String>,
        terminated_normally: &mut bool,
    ) -> Result<(), RunError> {
        for (n, line) in BufReader::new(stdout).lines().enumerate() {
            let line = line?;
            if line.to_lowercase().contains(NORMAL_TERMINATION) {
                *terminated_normally = true;
            }
            for o in observers.iter_mut() {
                o.at_each_line(self.ctx(n + 1, &line))?;
            }
            buffer.push(line);
        }
        Ok(())
    }
}

pub struct Logger;

impl Observer for Logger {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), RunError> {
        tracing::event!(
            tracing::Level::INFO,
            "running `{}` in {}",
            ctx.simulation().exe().display(),
            ctx.simulation().workspace().display()
        );
        Ok(())
    }

    fn at_each_line(&mut self, ctx: ObsCtx) -> Result<(), RunError> {
        tracing::event!(
            tracing::Level::TRACE,
            "simulation `{}` [{}]: {}",
            ctx.simulation().name(),
            ctx.line_number(),
            ctx.line()
        );
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx, report: &RunReport) -> Result<(), RunError> {
        if report.success {
            tracing::event!(
                tracing::Level::INFO,
                "simulation `{}` terminated normally",
                ctx.simulation().name()
            );
        } else {
            tracing::event!(
                tracing::Level::ERROR,
                "simulation `{}` failed (exit code {:?})",
                ctx.simulation().name(),
                report.exit_code
            );
        }
        Ok(())
    }
}

/// Forwards every engine line to a writer, like a verbose run.
pub struct Echo<W> {
    output: W,
}

impl<W: io::Write> Echo<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<W: io::Write> Observer for Echo<W> {
    fn at_each_line(&mut self, ctx: ObsCtx) -> Result<(), RunError> {
        writeln!(self.output, "{}", ctx.line()).map_err(RunError::from)
    }

    fn at_cleanup(&mut self, _ctx: ObsCtx, _report: &RunReport) -> Result<(), RunError> {
        self.output.flush().map_err(RunError::from)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{
        fs,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{grid::Discretization, model::GwfModel};

    // shell script standing in for the engine, run through `sh`
    fn fake_engine(dir: &Path, script: &str) -> String {
        let path = dir.join("fake-mf6.sh");
        fs::write(&path, format!("{script}\n")).unwrap();
        path.display().to_string()
    }

    fn simulation(dir: &Path) -> Simulation {
        let grid = Discretization::uniform_layers(1, 3, 2.0, 1.0).unwrap();
        Simulation::new("demo", GwfModel::new("demo", grid)).with_workspace(dir)
    }

    #[test]
    fn normal_termination_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(
            dir.path(),
            "echo 'MODFLOW 6'\necho ' Normal termination of simulation.'",
        );
        let sim = simulation(dir.path());

        let mut echoed = Vec::new();
        let report = Driver::new(&sim)
            .with_exe("sh")
            .with_arg(&script)
            .with_observer(Logger)
            .with_observer(Echo::new(&mut echoed))
            .run()
            .unwrap();

        assert!(report.success);
        assert_eq!(report.buffer.len(), 2);
        assert!(report.check().is_ok());
        assert_eq!(
            String::from_utf8(echoed).unwrap(),
            "MODFLOW 6\n Normal termination of simulation.\n"
        );
    }

    #[test]
    fn missing_termination_message_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "echo 'ERROR REPORT'\nexit 2");
        let sim = simulation(dir.path());

        let report = Driver::new(&sim)
            .with_exe("sh")
            .with_arg(&script)
            .run()
            .unwrap();
        assert!(!report.success);
        assert_eq!(report.exit_code, Some(2));
        assert!(matches!(
            report.check(),
            Err(RunError::AbnormalTermination { code: Some(2) })
        ));
    }

    #[test]
    fn zero_exit_without_message_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "echo 'stopped early'");
        let sim = simulation(dir.path());

        let report = Driver::new(&sim)
            .with_exe("sh")
            .with_arg(&script)
            .run()
            .unwrap();
        assert!(!report.success);
        assert_eq!(report.exit_code, Some(0));
    }

    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_observer_stops_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_engine(dir.path(), "echo 'MODFLOW 6'\nexec sleep 30");
        let sim = simulation(dir.path());

        let started = Instant::now();
        let result = Driver::new(&sim)
            .with_exe("sh")
            .with_arg(&script)
            .with_observer(Echo::new(Broken))
            .run();

        assert!(matches!(result, Err(RunError::Io(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let sim = simulation(dir.path()).with_exe(dir.path().join("nope"));
        assert!(matches!(
            Driver::new(&sim).run(),
            Err(RunError::Launch { .. })
        ));
    }
}
