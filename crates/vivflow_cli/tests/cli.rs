//! End-to-end tests of the `vivflow` binary against a stub tool.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn vivflow(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_vivflow"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Writes `adder.v` and `adder_tb.v` into `<tmp>/adder`.
fn adder_sources(tmp: &TempDir) -> PathBuf {
    let src = tmp.path().join("adder");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("adder.v"),
        "module adder(\n  input a, b,\n  output s\n);\n  assign s = a ^ b;\nendmodule\n",
    )
    .unwrap();
    fs::write(
        src.join("adder_tb.v"),
        "/* testbench */\nmodule adder_tb;\n  adder dut(.a(1'b0), .b(1'b1), .s());\nendmodule\n",
    )
    .unwrap();
    src
}

/// Points the workflow at a `/bin/sh` script in place of the tool.
fn use_stub_tool(tmp: &TempDir, src: &Path, body: &str) {
    let stub = tmp.path().join("fake_vivado.sh");
    fs::write(&stub, format!("{body}\n")).unwrap();
    fs::write(
        src.join("vivflow.toml"),
        format!("[tool]\npath = \"/bin/sh\"\nextra_args = ['{}']\n", stub.display()),
    )
    .unwrap();
}

#[test]
fn hardware_without_top_file_fails_early() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("adder");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("adder.v"), "module adder;\nendmodule\n").unwrap();

    let out = vivflow(&["hw", src.to_str().unwrap(), "--tool", "/nonexistent/vivado"], b"");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("no top-tagged file found"));
    assert!(!src.join("run_hardware.tcl").exists());
}

#[test]
fn missing_source_directory() {
    let tmp = TempDir::new().unwrap();
    let out = vivflow(&["sim", tmp.path().join("nope").to_str().unwrap()], b"");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("source directory not found"));
}

#[test]
fn missing_tool_is_reported_distinctly() {
    let tmp = TempDir::new().unwrap();
    let src = adder_sources(&tmp);
    let out = vivflow(
        &["sim", src.to_str().unwrap(), "--tool", "/nonexistent/vivado"],
        b"",
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("external tool not found"));
}

#[cfg(unix)]
#[test]
fn simulation_succeeds_with_json_report() {
    let tmp = TempDir::new().unwrap();
    let src = adder_sources(&tmp);
    use_stub_tool(
        &tmp,
        &src,
        "echo 'Launching simulation...'\necho \"args: $*\"\nexit 0",
    );

    let out = vivflow(
        &["--format", "json", "sim", src.to_str().unwrap(), "--time", "500ns"],
        b"",
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["workflow"], "simulation");
    assert_eq!(report["success"], true);
    assert_eq!(report["state"], "done");
    assert_eq!(report["board"], "basys3");
    assert_eq!(report["mode"], "batch");

    let err = stderr(&out);
    assert!(err.contains("Launching simulation..."));
    assert!(err.contains("-mode batch -source"));

    let script = fs::read_to_string(src.join("run_sim.tcl")).unwrap();
    assert!(script.contains("set_property top adder [current_fileset]"));
    assert!(script.contains("set_property top adder_tb [get_filesets sim_1]"));
    assert!(script.contains("\nrun 500ns\n"));
}

#[cfg(unix)]
#[test]
fn unknown_board_falls_back_to_basys3() {
    let tmp = TempDir::new().unwrap();
    let src = adder_sources(&tmp);
    use_stub_tool(&tmp, &src, "exit 0");

    let out = vivflow(
        &["sim", src.to_str().unwrap(), "--board", "unknown-board"],
        b"",
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("unknown board 'unknown-board'"));
    let script = fs::read_to_string(src.join("run_sim.tcl")).unwrap();
    assert!(script.contains("-part xc7a35tcpg236-1 -force"));
    assert!(script.contains("\nrun 1000ns\n"));
}

#[cfg(unix)]
#[test]
fn hardware_failure_shows_error_hint() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("blinky");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("blinky_top.v"), "module blinky_top(input clk);\nendmodule\n").unwrap();
    fs::write(src.join("basys3.xdc"), "## pins\n").unwrap();
    use_stub_tool(
        &tmp,
        &src,
        "echo 'Running Synthesis...'\necho 'ERROR: Synthesis failed: synth_design ERROR'\nexit 1",
    );

    let out = vivflow(&["hw", src.to_str().unwrap(), "--no-program"], b"");
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error: synthesis failed"));
    assert!(err.contains("  ERROR: Synthesis failed: synth_design ERROR"));
    assert!(err.contains("Full log:"));
}

#[cfg(unix)]
#[test]
fn hardware_prompt_declined() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("blinky");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("blinky_top.v"), "module blinky_top;\nendmodule\n").unwrap();
    use_stub_tool(&tmp, &src, "touch ran\nexit 0");

    let out = vivflow(&["hw", src.to_str().unwrap()], b"n\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Continue anyway? (y/n): "));
    assert!(!src.join("ran").exists());
    assert!(!src.join("run_hardware.tcl").exists());
}

#[cfg(unix)]
#[test]
fn timeout_stops_the_tool() {
    let tmp = TempDir::new().unwrap();
    let src = adder_sources(&tmp);
    use_stub_tool(&tmp, &src, "exec sleep 30");

    let start = std::time::Instant::now();
    let out = vivflow(&["--timeout", "1", "sim", src.to_str().unwrap()], b"");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("timed out"));
    assert!(start.elapsed() < std::time::Duration::from_secs(20));
}

#[cfg(unix)]
#[test]
fn device_manager_failure_prints_manual_steps() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("blinky");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("blinky_top.v"), "module blinky_top;\nendmodule\n").unwrap();
    fs::write(src.join("basys3.xdc"), "## pins\n").unwrap();
    use_stub_tool(&tmp, &src, "mkdir run_program_gui.tcl\nexit 0");

    let out = vivflow(&["--format", "json", "hw", src.to_str().unwrap(), "--gui"], b"");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let err = stderr(&out);
    assert!(err.contains("could not open the device manager"));
    assert!(err.contains("To program manually:"));
    assert!(err.contains("blinky.xpr in Vivado"));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["device_manager"], false);
}

#[cfg(unix)]
#[test]
fn device_manager_launch_reported() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("blinky");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("blinky_top.v"), "module blinky_top;\nendmodule\n").unwrap();
    fs::write(src.join("basys3.xdc"), "## pins\n").unwrap();
    use_stub_tool(&tmp, &src, "exit 0");

    let out = vivflow(&["--format", "json", "hw", src.to_str().unwrap(), "--gui"], b"");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["device_manager"], true);
    assert!(src.join("run_program_gui.tcl").is_file());
}
