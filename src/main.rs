//! Weft CLI and REPL
//!
//! Usage:
//!   weft run <file.weft>   - Execute a Weft file
//!   weft repl              - Start interactive REPL
//!   weft help              - Show help message

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use weft::{Executor, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: weft run <file.weft>");
                process::exit(1);
            }
            run_file(&args[2]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Weft {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".weft") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("{}", "Weft".cyan().bold());
    println!("A tiny imperative language on a threaded instruction graph");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  weft run <file.weft>   Execute a Weft file");
    println!("  weft repl              Start interactive REPL");
    println!("  weft help              Show this help message");
    println!("  weft version           Show version\n");
    println!("{}", "EXAMPLES:".yellow());
    println!("  weft run demos/countdown.weft");
    println!("  weft repl\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  fun f(a) {{ return a }}   Function definition");
    println!("  var x                    Variable declaration");
    println!("  x = 10                   Assignment");
    println!("  if (x) {{ }} else {{ }}     Conditional");
    println!("  while (x) {{ }}            Loop");
    println!("  print(x)                 Print a value");
}

fn run_file(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    let program = match weft::compile_with_origin(&source, Some(path)) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e.with_source(&source));
            process::exit(1);
        }
    };

    if let Err(e) = Executor::new().run(&program) {
        eprintln!("{}", e.with_source(&source));
        process::exit(1);
    }
}

fn run_repl() {
    println!(
        "{} {} - {}",
        "Weft".cyan().bold(),
        VERSION.cyan(),
        "a threaded-code interpreter".dimmed()
    );
    println!(
        "Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{}: cannot start line editor: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // Function definitions persist across REPL lines
    let mut definitions: Vec<String> = Vec::new();

    loop {
        match rl.readline(&format!("{} ", "weft>".green().bold())) {
            Ok(line) => {
                let line = line.trim().to_string();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match line.as_str() {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "clear" => {
                        definitions.clear();
                        println!("{}", "Definitions cleared.".dimmed());
                        continue;
                    }
                    _ => {}
                }

                if line.starts_with("fun ") || line == "fun" {
                    define_function(&mut definitions, line);
                } else {
                    evaluate_line(&definitions, &line);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

/// Add a function definition after checking it compiles together with
/// everything defined so far
fn define_function(definitions: &mut Vec<String>, line: String) {
    let mut source = definitions.join("\n");
    source.push('\n');
    source.push_str(&line);

    match weft::compile(&source) {
        Ok(_) => definitions.push(line),
        Err(e) => eprintln!("{}", format!("{}", e.with_source(&source)).red()),
    }
}

/// Run a line of statements against the accumulated definitions. A line
/// that parses as a single expression is wrapped in a `return` and its
/// value echoed; anything else runs for its effects.
fn evaluate_line(definitions: &[String], line: &str) {
    let prelude = definitions.join("\n");

    let as_expression = format!("{}\nfun main() {{ return {} }}", prelude, line);
    if let Ok(program) = weft::compile(&as_expression) {
        match Executor::new().run(&program) {
            Ok(value) => println!("{} {}", "=>".dimmed(), format!("{}", value).cyan()),
            Err(e) => eprintln!("{}", format!("{}", e.with_source(&as_expression)).red()),
        }
        return;
    }

    let as_statements = format!("{}\nfun main() {{ {} }}", prelude, line);
    match weft::compile(&as_statements) {
        Ok(program) => {
            if let Err(e) = Executor::new().run(&program) {
                eprintln!("{}", format!("{}", e.with_source(&as_statements)).red());
            }
        }
        Err(e) => eprintln!("{}", format!("{}", e.with_source(&as_statements)).red()),
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  clear        Forget all function definitions");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  fun double(n) {{ return n * 2 }}");
    println!("  double(21)");
    println!("  var x x = 5 while (x) {{ print(x) x = x - 1 }}");
}
