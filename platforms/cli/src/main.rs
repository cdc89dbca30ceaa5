use clap::Parser;
use log::{debug, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use turing_tape::{
    ExecutionResult, Program, ProgramLoader, ProgramManager, Status, TuringMachine,
    TuringMachineError,
};

/// Runs single-tape Turing machines defined in `.tm` files.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turing-tape --builtin 'Binary increment'
  turing-tape --program increment.tm --input 1011 --trace
  cat increment.tm | turing-tape --json

EXIT STATUS:
  0 halted, 1 load error, 2 crashed, 3 step budget exhausted")]
struct Cli {
    /// The machine definition file (.tm) to execute. Read from stdin when piped.
    #[clap(short, long, conflicts_with = "builtin")]
    program: Option<String>,

    /// Run a built-in program by name
    #[clap(short, long)]
    builtin: Option<String>,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,

    /// Replace the initial tape; '_' stands for the blank symbol
    #[clap(short, long)]
    input: Option<String>,

    /// Print each step of the execution
    #[clap(short, long)]
    trace: bool,

    /// Stop after this many steps if the machine is still running
    #[clap(short, long)]
    max_steps: Option<usize>,

    /// Print the final snapshot as JSON
    #[clap(long)]
    json: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if cli.list {
        list_programs();
        return ExitCode::SUCCESS;
    }

    let mut program = match load_program(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(input) = &cli.input {
        program.set_input(input);
    }

    debug!("running '{}'", program.name);
    let mut machine = TuringMachine::from_program(&program);
    let result = run(&mut machine, &cli);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print_result(&machine, &result);
    }

    match result.status() {
        Status::Halted => ExitCode::SUCCESS,
        Status::Crashed => ExitCode::from(2),
        Status::Running => ExitCode::from(3),
    }
}

/// Installs a terminal logger on stderr.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // A logger may already be installed; the CLI works without one.
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

/// Loads the program from a file, the built-in library, or piped stdin, in that order.
fn load_program(cli: &Cli) -> Result<Program, TuringMachineError> {
    if let Some(path) = &cli.program {
        ProgramLoader::load_program(Path::new(path))
    } else if let Some(name) = &cli.builtin {
        ProgramManager::get_program_by_name(name)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| TuringMachineError::FileError(format!("Failed to read stdin: {}", e)))?;
        ProgramLoader::load_program_from_string(&buffer)
    } else {
        Err(TuringMachineError::ValidationError(
            "No program given: use --program, --builtin or pipe a definition".to_string(),
        ))
    }
}

/// Runs the machine to completion, stepping one transition at a time when tracing or when
/// a step budget applies.
fn run(machine: &mut TuringMachine, cli: &Cli) -> ExecutionResult {
    if !cli.trace && cli.max_steps.is_none() {
        return machine.execute();
    }

    if cli.trace {
        print_trace(machine);
    }

    let mut result = machine.snapshot();
    while !result.is_terminal() {
        if let Some(max) = cli.max_steps.filter(|&max| machine.step_count() >= max) {
            // The last step may have left the machine stuck
            result = machine.snapshot();
            if !result.is_terminal() {
                warn!("step budget of {} exhausted, machine still running", max);
            }
            break;
        }

        let before = machine.step_count();
        result = machine.step();

        if cli.trace && machine.step_count() > before {
            print_trace(machine);
        }
    }

    result
}

fn list_programs() {
    for index in 0..ProgramManager::get_program_count() {
        if let Ok(info) = ProgramManager::get_program_info(index) {
            println!(
                "{:<24} start: {:<6} tape: {:<12} states: {:<3} rules: {}",
                info.name, info.initial_state, info.initial_tape, info.state_count, info.transition_count
            );
        }
    }
}

fn print_trace(machine: &TuringMachine) {
    println!(
        "Step: {:>5}, State: {:<8} Head: {:>4}, Tape: {}",
        machine.step_count(),
        machine.state(),
        machine.head_position(),
        format_tape(machine)
    );
}

fn print_result(machine: &TuringMachine, result: &ExecutionResult) {
    println!("Status: {}", result.status());
    println!("State: {}", result.state);
    println!("Head: {}", result.head_position);
    println!("Steps: {}", machine.step_count());
    println!("Tape: {}", format_tape(machine));
}

/// Renders the occupied span of the tape, widened to include the head, with the cell under
/// the head in brackets.
fn format_tape(machine: &TuringMachine) -> String {
    let tape = machine.tape();
    let head = machine.head_position();
    let (first, last) = tape
        .bounds()
        .map_or((head, head), |(first, last)| (first.min(head), last.max(head)));

    (first..=last)
        .map(|position| {
            let symbol = tape.read(position);
            if position == head {
                format!("[{}]", symbol)
            } else {
                symbol.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tape_marks_head() {
        let program = ProgramManager::get_program_by_name("Binary increment").unwrap();
        let mut machine = TuringMachine::from_program(&program);
        assert_eq!(format_tape(&machine), "[1]01");

        machine.execute();
        assert_eq!(format_tape(&machine), "1[1]0");
    }

    #[test]
    fn test_format_tape_widens_to_head() {
        let program = ProgramManager::get_program_by_name("Busy beaver (2 states)").unwrap();
        let machine = TuringMachine::from_program(&program);

        // Empty tape: only the cell under the head is shown.
        assert_eq!(format_tape(&machine), "[0]");
    }

    #[test]
    fn test_run_with_budget_stops_early() {
        let cli = Cli::parse_from(["turing-tape", "--max-steps", "2"]);
        let program = ProgramManager::get_program_by_name("Busy beaver (3 states)").unwrap();
        let mut machine = TuringMachine::from_program(&program);

        let result = run(&mut machine, &cli);
        assert_eq!(result.status(), Status::Running);
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_run_with_budget_reports_stuck_machine() {
        let cli = Cli::parse_from(["turing-tape", "--max-steps", "3"]);
        let program = turing_tape::parse(
            "name: Runs off\ntape: 1, 0, 1\nrules:\n  q0, 0 -> q0, 0, R\n  q0, 1 -> q0, 1, R",
        )
        .unwrap();
        let mut machine = TuringMachine::from_program(&program);

        let result = run(&mut machine, &cli);
        assert_eq!(machine.step_count(), 3);
        assert_eq!(result.status(), Status::Crashed);
        assert_eq!(result.status(), machine.status());
    }

    #[test]
    fn test_run_with_budget_matches_execute() {
        let cli = Cli::parse_from(["turing-tape", "--max-steps", "1000"]);
        let program = ProgramManager::get_program_by_name("Unary addition").unwrap();

        let stepped = run(&mut TuringMachine::from_program(&program), &cli);
        let executed = TuringMachine::from_program(&program).execute();
        assert_eq!(stepped, executed);
    }
}
