//! Typed control-script directives and their Tcl rendering.
//!
//! Each [`Directive`] renders to one or more complete Tcl lines without a
//! trailing newline. Stage banners and completion lines are exported as
//! constants so the host can follow progress in the streamed output.

use std::fmt;
use std::path::PathBuf;

/// Banner printed when programming starts.
pub const PROGRAMMING_BANNER: &str = "Programming Device...";

/// Line printed after the device was programmed.
pub const PROGRAMMED_LINE: &str = "Device programmed successfully!";

/// Banner printed when the behavioral simulation is launched.
pub const SIMULATION_BANNER: &str = "Launching simulation...";

const RULE: &str = "=========================================";

/// A project file group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileSet {
    /// Synthesizable design sources.
    Sources,
    /// Simulation-only sources.
    Simulation,
    /// Constraint files.
    Constraints,
}

impl FileSet {
    /// The tool's name for the file group.
    pub fn tcl_name(self) -> &'static str {
        match self {
            FileSet::Sources => "sources_1",
            FileSet::Simulation => "sim_1",
            FileSet::Constraints => "constrs_1",
        }
    }
}

/// Which file group a top-module property is set on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopScope {
    /// The current (design) file group.
    Design,
    /// The simulation file group.
    Simulation,
}

/// One implementation run step, checked against the tool's completion marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunStep {
    /// Logic synthesis.
    Synthesis,
    /// Place and route.
    Implementation,
    /// Bitstream generation, a sub-step of the implementation run.
    Bitstream,
}

impl RunStep {
    /// The steps in execution order.
    pub const ALL: [RunStep; 3] = [
        RunStep::Synthesis,
        RunStep::Implementation,
        RunStep::Bitstream,
    ];

    /// The tool run that executes this step.
    pub fn run_name(self) -> &'static str {
        match self {
            RunStep::Synthesis => "synth_1",
            RunStep::Implementation | RunStep::Bitstream => "impl_1",
        }
    }

    /// Run status reported once the step completed successfully.
    pub fn complete_marker(self) -> &'static str {
        match self {
            RunStep::Synthesis => "synth_design Complete!",
            RunStep::Implementation => "route_design Complete!",
            RunStep::Bitstream => "write_bitstream Complete!",
        }
    }

    /// Human-readable step name.
    pub fn label(self) -> &'static str {
        match self {
            RunStep::Synthesis => "Synthesis",
            RunStep::Implementation => "Implementation",
            RunStep::Bitstream => "Bitstream generation",
        }
    }

    /// Banner printed by the script when the step starts.
    pub fn banner(self) -> &'static str {
        match self {
            RunStep::Synthesis => "Running Synthesis...",
            RunStep::Implementation => "Running Implementation...",
            RunStep::Bitstream => "Generating Bitstream...",
        }
    }

    /// Line printed by the script when the step succeeded.
    pub fn success_line(self) -> &'static str {
        match self {
            RunStep::Synthesis => "Synthesis completed successfully",
            RunStep::Implementation => "Implementation completed successfully",
            RunStep::Bitstream => "Bitstream generated successfully",
        }
    }

    fn status_var(self) -> &'static str {
        match self {
            RunStep::Synthesis => "synth_status",
            RunStep::Implementation => "impl_status",
            RunStep::Bitstream => "bit_status",
        }
    }
}

impl fmt::Display for RunStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single control-script directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// An empty line.
    Blank,
    /// A `#` comment.
    Comment(String),
    /// Print a line.
    Puts(String),
    /// Print a line framed by rules.
    Banner(String),
    /// Create a new project, replacing any existing one.
    CreateProject {
        /// Project name.
        name: String,
        /// Project directory.
        dir: PathBuf,
        /// FPGA part identifier.
        part: String,
    },
    /// Set the board part; an unrecognized identifier is reported, not fatal.
    SetBoardPart(String),
    /// Select Verilog as the project language.
    SetTargetLanguage,
    /// Open an existing project file.
    OpenProject(PathBuf),
    /// Add one file to a file group.
    AddFile {
        /// Destination file group.
        fileset: FileSet,
        /// File to add.
        path: PathBuf,
    },
    /// Set the top module of a file group.
    SetTop {
        /// Which group.
        scope: TopScope,
        /// Module name.
        module: String,
    },
    /// Refresh the compile order of a file group.
    UpdateCompileOrder(FileSet),
    /// Reset a step's run.
    ResetRun(RunStep),
    /// Launch a step's run.
    LaunchRun(RunStep),
    /// Block until a step's run finishes.
    WaitOnRun(RunStep),
    /// Abort with an error unless the run reports the step's completion marker.
    RequireStatus(RunStep),
    /// Open the hardware manager.
    OpenHwManager,
    /// Connect to the local hardware server.
    ConnectHwServer,
    /// Open the hardware target.
    OpenHwTarget {
        /// Exit with an error when no target is reachable.
        abort_on_failure: bool,
    },
    /// Select the first enumerated device, failing if there is none.
    SelectFirstDevice,
    /// Assign the implementation run's bitstream to the selected device.
    AssignBitstream,
    /// Program the selected device.
    ProgramDevice,
    /// Refresh the selected device.
    RefreshDevice,
    /// Close the target, disconnect the server, and close the hardware manager.
    CloseHwManager,
    /// Launch a behavioral simulation.
    LaunchSimulation,
    /// Run the simulation for a duration, passed through verbatim.
    RunFor(String),
    /// Add every top-level signal to the waveform view.
    AddWaveAll,
    /// Persist the waveform configuration.
    SaveWaveConfig,
    /// Close the simulation.
    CloseSim,
    /// Close the project.
    CloseProject,
    /// Exit the tool with a status code.
    Exit(i32),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Blank => Ok(()),
            Directive::Comment(text) => write!(f, "# {text}"),
            Directive::Puts(text) => write!(f, "puts \"{text}\""),
            Directive::Banner(text) => write!(
                f,
                "puts \"{RULE}\"\nputs \"{text}\"\nputs \"{RULE}\""
            ),
            Directive::CreateProject { name, dir, part } => write!(
                f,
                "create_project {{{name}}} {{{}}} -part {part} -force",
                dir.display()
            ),
            Directive::SetBoardPart(board_part) => write!(
                f,
                "if {{[catch {{set_property board_part {board_part} [current_project]}}]}} {{\n    \
                 puts \"Note: Board part not available, using part only\"\n}}"
            ),
            Directive::SetTargetLanguage => {
                f.write_str("set_property target_language Verilog [current_project]")
            }
            Directive::OpenProject(path) => write!(f, "open_project {{{}}}", path.display()),
            Directive::AddFile { fileset, path } => match fileset {
                FileSet::Sources => write!(f, "add_files -norecurse {{{}}}", path.display()),
                other => write!(
                    f,
                    "add_files -fileset {} -norecurse {{{}}}",
                    other.tcl_name(),
                    path.display()
                ),
            },
            Directive::SetTop { scope, module } => match scope {
                TopScope::Design => write!(f, "set_property top {module} [current_fileset]"),
                TopScope::Simulation => {
                    write!(f, "set_property top {module} [get_filesets sim_1]")
                }
            },
            Directive::UpdateCompileOrder(fileset) => {
                write!(f, "update_compile_order -fileset {}", fileset.tcl_name())
            }
            Directive::ResetRun(step) => write!(f, "reset_run {}", step.run_name()),
            Directive::LaunchRun(step) => match step {
                RunStep::Bitstream => write!(
                    f,
                    "launch_runs {} -to_step write_bitstream",
                    step.run_name()
                ),
                _ => write!(f, "launch_runs {}", step.run_name()),
            },
            Directive::WaitOnRun(step) => write!(f, "wait_on_run {}", step.run_name()),
            Directive::RequireStatus(step) => {
                let var = step.status_var();
                write!(
                    f,
                    "set {var} [get_property STATUS [get_runs {run}]]\n\
                     if {{${var} != \"{marker}\"}} {{\n    \
                     puts \"ERROR: {label} failed: ${var}\"\n    \
                     exit 1\n\
                     }}",
                    run = step.run_name(),
                    marker = step.complete_marker(),
                    label = step.label(),
                )
            }
            Directive::OpenHwManager => f.write_str("open_hw_manager"),
            Directive::ConnectHwServer => f.write_str("connect_hw_server -allow_non_jtag"),
            Directive::OpenHwTarget { abort_on_failure } => {
                if *abort_on_failure {
                    f.write_str(
                        "if {[catch {open_hw_target}]} {\n    \
                         puts \"ERROR: Could not connect to hardware target\"\n    \
                         puts \"Make sure the FPGA board is connected and powered on\"\n    \
                         exit 1\n\
                         }",
                    )
                } else {
                    f.write_str(
                        "if {[catch {open_hw_target}]} {\n    \
                         puts \"Note: No hardware target found; connect the board and use Open Target\"\n\
                         }",
                    )
                }
            }
            Directive::SelectFirstDevice => f.write_str(
                "set device [lindex [get_hw_devices] 0]\n\
                 if {$device == \"\"} {\n    \
                 puts \"ERROR: No hardware device found\"\n    \
                 exit 1\n\
                 }\n\
                 current_hw_device $device\n\
                 refresh_hw_device $device",
            ),
            Directive::AssignBitstream => f.write_str(
                "set bit_file [get_property DIRECTORY [get_runs impl_1]]/[get_property top [current_fileset]].bit\n\
                 set_property PROGRAM.FILE $bit_file $device",
            ),
            Directive::ProgramDevice => f.write_str("program_hw_devices $device"),
            Directive::RefreshDevice => f.write_str("refresh_hw_device $device"),
            Directive::CloseHwManager => {
                f.write_str("close_hw_target\ndisconnect_hw_server\nclose_hw_manager")
            }
            Directive::LaunchSimulation => f.write_str("launch_simulation -mode behavioral"),
            Directive::RunFor(duration) => write!(f, "run {duration}"),
            Directive::AddWaveAll => f.write_str("catch {\n    add_wave {/*}\n}"),
            Directive::SaveWaveConfig => f.write_str("save_wave_config"),
            Directive::CloseSim => f.write_str("close_sim"),
            Directive::CloseProject => f.write_str("close_project"),
            Directive::Exit(code) => write!(f, "exit {code}"),
        }
    }
}
