use std::{
    error::Error,
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, ValueEnum};
use log::{debug, info};

use grammar_classifier::{
    grammar::{pretty_print::ParseTraceOutput, ClassifyError, GrammarClass, Method},
    split_input, Classifier, Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow sets
    Ff,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0,
    /// SLR(1) parsing table
    Slr1,
    /// Classification and conflicts
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Plain,
    Latex,
    Json,
}

/// Decide whether a context-free grammar is LL(1), SLR(1), both or neither,
/// then test strings against it.
#[derive(Debug, Parser)]
#[command(name = "grammar-classifier", version)]
struct Cli {
    /// Print these artefacts instead of starting the interactive session
    #[arg(short, long, value_enum, num_args = 1..)]
    output: Vec<Output>,

    #[arg(long, value_enum, default_value_t = Format::Plain)]
    format: Format,

    /// Print the parser's stack and input at every step
    #[arg(short, long)]
    trace: bool,

    /// Grammar file; read from stdin when absent
    file: Option<PathBuf>,
}

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Reads an optional count line, then that many production lines, or every
/// line up to the first blank one when there is no count.
fn read_grammar_lines(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<String> {
    let mut buf = Vec::new();
    let mut expected: Option<usize> = None;

    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if buf.is_empty() && expected.is_none() {
            if trimmed.is_empty() {
                continue;
            }
            if let Ok(n) = trimmed.parse::<usize>() {
                expected = Some(n);
                buf.push(line);
                if n == 0 {
                    break;
                }
                continue;
            }
        }

        match expected {
            Some(n) => {
                if trimmed.is_empty() {
                    continue;
                }
                buf.push(line);
                if buf.len() > n {
                    break;
                }
            }
            None => {
                if trimmed.is_empty() {
                    break;
                }
                buf.push(line);
            }
        }
    }

    Ok(buf.join("\n"))
}

fn render<T: serde::Serialize>(
    format: Format,
    t: &T,
    plain: impl FnOnce(&T) -> String,
    latex: impl FnOnce(&T) -> String,
) -> Result<String> {
    Ok(match format {
        Format::Plain => plain(t),
        Format::Latex => latex(t),
        Format::Json => serde_json::to_string(t)?,
    })
}

fn print_outputs(c: &Classifier, outputs: &[Output], format: Format) -> Result<()> {
    let g = c.grammar();
    for output in outputs {
        let text = match output {
            Output::Prod => render(
                format,
                &g.to_production_output_vec(),
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Ff => render(
                format,
                &g.to_non_terminal_output_vec(c.first(), c.follow()),
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Ll1 => render(
                format,
                &c.ll1_table().to_output(g),
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Lr0 => match format {
                Format::Plain => c.automaton().to_plaintext(),
                Format::Latex => c.automaton().to_latex(),
                Format::Json => serde_json::to_string(&c.automaton().to_output())?,
            },
            Output::Slr1 => render(
                format,
                &c.slr1_tables().to_output(g),
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Class => render(
                format,
                &c.classify(),
                |t| t.to_plaintext(g),
                |t| t.to_latex(g),
            )?,
        };
        println!("{}", text);
    }
    Ok(())
}

fn prompt(out: &mut impl Write, text: &str) -> Result<()> {
    write!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}

/// `None` on `Q` or end of input.
fn choose_method(
    class: GrammarClass,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<Option<Method>> {
    match class {
        GrammarClass::LL1Only => return Ok(Some(Method::LL1)),
        GrammarClass::SLR1Only => return Ok(Some(Method::SLR1)),
        GrammarClass::Neither => return Ok(None),
        GrammarClass::Both => {}
    }

    loop {
        prompt(out, "Select a parser (T: for LL(1), B: for SLR(1), Q: quit): ")?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(None),
        };
        if line.trim().eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match Method::from_name(&line) {
            Some(m) => return Ok(Some(m)),
            None => writeln!(out, "Unknown choice \"{}\".", line.trim())?,
        }
    }
}

/// Answers `yes`/`no` for every line up to a blank one.
fn test_strings(
    c: &Classifier,
    method: Method,
    trace: bool,
    format: Format,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    loop {
        prompt(out, "Enter a string to test (blank line to stop): ")?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        if line.trim().is_empty() {
            return Ok(());
        }

        let tokens = split_input(&line);
        debug!("tokens: {:?}", tokens);
        let (outcome, steps) = match method {
            Method::LL1 => match c.ll1_parser() {
                Some(p) => p.parse_with_trace(&tokens),
                None => return Err(ClassifyError::NotApplicable(method).into()),
            },
            Method::SLR1 => match c.slr1_parser() {
                Some(p) => p.parse_with_trace(&tokens),
                None => return Err(ClassifyError::NotApplicable(method).into()),
            },
        };

        if trace {
            let t = ParseTraceOutput::new(&steps, &outcome);
            let text = render(format, &t, |t| t.to_plaintext(), |t| t.to_latex())?;
            writeln!(out, "{}", text)?;
        }
        writeln!(out, "{}", if outcome.is_accepted() { "yes" } else { "no" })?;
    }
}

/// Prints the class, then tests strings. A grammar in both classes goes back
/// to the parser prompt after each run until `Q`.
fn session(
    c: &Classifier,
    trace: bool,
    format: Format,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl Write,
) -> Result<()> {
    let class = c.class();
    writeln!(out, "Grammar is {}.", class)?;

    while let Some(method) = choose_method(class, lines, out)? {
        info!("testing strings with {}", method);
        test_strings(c, method, trace, format, lines, out)?;
        if class != GrammarClass::Both {
            break;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let text = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => read_grammar_lines(&mut lines)?,
    };
    let g = Grammar::parse(&text)?;
    let c = Classifier::new(g);

    if cli.output.is_empty() {
        let stdout = io::stdout();
        session(&c, cli.trace, cli.format, &mut lines, &mut stdout.lock())
    } else {
        print_outputs(&c, &cli.output, cli.format)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use grammar_classifier::{Classifier, Grammar};

    use super::{read_grammar_lines, session, Format};

    fn lines(s: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
        s.lines().map(|l| Ok(l.to_string()))
    }

    #[test]
    fn counted_grammar() {
        let mut it = lines("2\nS -> aA e\n\nA -> bS e\nab\n");
        assert_eq!(
            read_grammar_lines(&mut it).unwrap(),
            "2\nS -> aA e\nA -> bS e"
        );
        assert_eq!(it.next().unwrap().unwrap(), "ab");
    }

    #[test]
    fn blank_terminated_grammar() {
        let mut it = lines("\nS -> a\nS -> b\n\nab");
        assert_eq!(read_grammar_lines(&mut it).unwrap(), "S -> a\nS -> b");
        assert_eq!(it.next().unwrap().unwrap(), "ab");
    }

    fn run_session(grammar: &str, input: &str) -> (String, Vec<String>) {
        let c = Classifier::new(Grammar::parse(grammar).unwrap());
        let mut it = lines(input);
        let mut out = Vec::new();
        session(&c, false, Format::Plain, &mut it, &mut out).unwrap();
        let rest = it.map(|l| l.unwrap()).collect();
        (String::from_utf8(out).unwrap(), rest)
    }

    fn verdicts(text: &str) -> Vec<&str> {
        text.split_whitespace()
            .filter(|w| *w == "yes" || *w == "no")
            .collect()
    }

    #[test]
    fn session_switches_parsers() {
        let (text, rest) = run_session(
            "S -> aA e\nA -> bS e",
            "T\nab\n\nB\nab\nb\n\nQ\nleft over",
        );

        assert!(text.starts_with("Grammar is LL(1) and SLR(1)."));
        assert_eq!(verdicts(&text), vec!["yes", "yes", "no"]);
        assert_eq!(text.matches("Select a parser").count(), 3);
        assert_eq!(rest, vec!["left over"]);
    }

    #[test]
    fn session_ends_with_input() {
        let (text, rest) = run_session("S -> aA e\nA -> bS e", "x\nB\naba");

        assert!(text.contains("Unknown choice \"x\"."));
        assert_eq!(verdicts(&text), vec!["yes"]);
        assert!(rest.is_empty());
    }

    #[test]
    fn single_class_session_stops_at_blank_line() {
        let (text, rest) = run_session("3\nS -> S+T T\nT -> T*F F\nF -> (S) i", "i+i*i\ni+\n\nT");

        assert!(text.starts_with("Grammar is SLR(1)."));
        assert!(!text.contains("Select a parser"));
        assert_eq!(verdicts(&text), vec!["yes", "no"]);
        assert_eq!(rest, vec!["T"]);
    }

    #[test]
    fn neither_class_tests_nothing() {
        let (text, rest) = run_session("S -> iSeS iS a", "a\n");

        assert_eq!(text, "Grammar is neither LL(1) nor SLR(1).\n");
        assert_eq!(rest, vec!["a"]);
    }
}
