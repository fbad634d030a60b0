use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    classifier::ClassificationResult,
    first_follow::{FirstSets, FollowSets},
    ll1_parsing_table::LL1Table,
    lr_dfa::{Automaton, Item, ItemSet},
    outcome::{ParseOutcome, ParseStep},
    slr1_parsing_table::{Action, SLR1Tables},
    Grammar, Production, Symbol, END_MARK, EPSILON,
};

/// Right-aligns every column and joins cells with `|`.
fn align(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn production_rights(production: &Production) -> Vec<&str> {
    production.right.iter().map(|s| s.name()).collect()
}

fn lookahead_columns(grammar: &Grammar) -> Vec<Symbol> {
    grammar
        .terminal_iter()
        .map(|t| Symbol::terminal(t.as_str()))
        .chain(std::iter::once(Symbol::EndMarker))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow & ", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| {
                        if terminal_set.contains(s) {
                            format!("\\text{{{}}}", escape::tex(*s))
                        } else {
                            escape::tex(*s).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        (left + &right).replace(EPSILON, "\\epsilon")
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.as_str(),
                rights: self
                    .productions_of(nt)
                    .iter()
                    .map(|&idx| production_rights(self.production(idx)))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_iter().map(|t| t.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.nullable.to_string(),
            self.first.join(", "),
            self.follow.join(", "),
        ]
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let header: Vec<String> = ["Symbol", "Nullable", "First", "Follow"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = std::iter::once(header)
            .chain(self.data.iter().map(|s| s.to_plaintext()))
            .collect();
        align(&rows)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec<'a>(
        &'a self,
        first: &'a FirstSets,
        follow: &'a FollowSets,
    ) -> NonTerminalOutputVec<'a> {
        let data = self
            .non_terminal_iter()
            .map(|nt| NonTerminalOutput {
                name: nt.as_str(),
                nullable: first.is_nullable(nt),
                first: first.of(nt).iter().map(|s| s.name()).collect(),
                follow: follow.of(nt).iter().map(|s| s.name()).collect(),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }
        align(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(escape::tex(*left).to_string())
                    .chain(row.iter().map(|productions| {
                        let cell = productions.to_latex(false, &terminal_set);
                        if productions.rights.len() > 1 {
                            format!("{{\\color{{red}}{}}}", cell)
                        } else {
                            cell
                        }
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl LL1Table {
    /// Conflicting cells list every production that claimed them.
    pub fn to_output<'a>(&'a self, grammar: &'a Grammar) -> LL1ParsingTableOutput<'a> {
        let columns = lookahead_columns(grammar);

        let rows: Vec<(&str, Vec<ProductionOutput>)> = grammar
            .non_terminal_iter()
            .map(|nt| {
                let row: Vec<ProductionOutput> = columns
                    .iter()
                    .map(|la| {
                        let mut rights: Vec<Vec<&str>> = self
                            .get(nt, la)
                            .map(|idx| production_rights(grammar.production(idx)))
                            .into_iter()
                            .collect();
                        rights.extend(
                            self.conflicts()
                                .iter()
                                .filter(|c| &c.non_terminal == nt && &c.lookahead == la)
                                .map(|c| production_rights(&c.rejected)),
                        );
                        ProductionOutput {
                            left: nt.as_str(),
                            rights,
                        }
                    })
                    .collect();
                (nt.as_str(), row)
            })
            .collect();

        LL1ParsingTableOutput {
            terminals: grammar
                .terminal_iter()
                .map(|t| t.as_str())
                .chain(std::iter::once(END_MARK))
                .collect(),
            rows,
        }
    }
}

impl Item {
    pub fn to_plaintext(&self, grammar: &Grammar) -> String {
        let production = grammar.production(self.production);
        let mut right: Vec<&str> = production.body().iter().map(|s| s.name()).collect();
        right.insert(self.dot.min(right.len()), ".");
        format!("{} -> {}", production.left, right.join(" "))
    }

    pub fn to_latex(&self, grammar: &Grammar) -> String {
        let production = grammar.production(self.production);
        let mut right: Vec<String> = production
            .body()
            .iter()
            .map(|s| escape::tex(s.name()).to_string())
            .collect();
        right.insert(self.dot.min(right.len()), ".".to_string());
        format!(
            "${} \\rightarrow {}$",
            escape::tex(production.left.as_str()),
            right.join(" ")
        )
    }
}

impl ItemSet {
    pub fn to_plaintext(&self, grammar: &Grammar) -> String {
        let kernel = self
            .kernel
            .iter()
            .map(|c| c.to_plaintext(grammar))
            .collect::<Vec<_>>()
            .join("\n");

        let extend: Vec<String> = self.extend().map(|c| c.to_plaintext(grammar)).collect();
        let extend = if !extend.is_empty() {
            format!("\n---\n{}", extend.join("\n"))
        } else {
            String::new()
        };

        let edges = if !self.edges.is_empty() {
            format!(
                "\n===\n{}",
                self.edges
                    .iter()
                    .map(|(k, v)| format!("- {} -> {}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        format!("{}{}{}", kernel, extend, edges)
    }

    pub fn node_to_latex(&self, id: usize, grammar: &Grammar) -> String {
        let content = self
            .kernel
            .iter()
            .chain(self.extend())
            .map(|e| e.to_latex(grammar))
            .collect::<Vec<_>>()
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    pub fn edge_to_latex(&self, id: usize) -> String {
        self.edges
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(e.name()),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Serialize)]
struct EdgeOutput<'a> {
    symbol: &'a str,
    target: usize,
}

#[derive(Serialize)]
struct StateOutput<'a> {
    kernel: Vec<String>,
    extend: Vec<String>,
    edges: Vec<EdgeOutput<'a>>,
}

#[derive(Serialize)]
pub struct AutomatonOutput<'a> {
    states: Vec<StateOutput<'a>>,
    start: usize,
}

impl Automaton {
    pub fn to_plaintext(&self) -> String {
        let states = self
            .states()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("I{}\n{}", i, s.to_plaintext(self.grammar())))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\nstart: 0", states)
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states()
                .iter()
                .enumerate()
                .map(|(i, s)| s.node_to_latex(i, self.grammar()))
                .chain(self.states().iter().enumerate().map(|(i, s)| s.edge_to_latex(i)))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    pub fn to_output(&self) -> AutomatonOutput {
        let g = self.grammar();
        AutomatonOutput {
            states: self
                .states()
                .iter()
                .map(|s| StateOutput {
                    kernel: s.kernel.iter().map(|i| i.to_plaintext(g)).collect(),
                    extend: s.extend().map(|i| i.to_plaintext(g)).collect(),
                    edges: s
                        .edges
                        .iter()
                        .map(|(x, &v)| EdgeOutput {
                            symbol: x.name(),
                            target: v,
                        })
                        .collect(),
                })
                .collect(),
            start: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub enum LRParsingTableAction<'a> {
    Reduce((&'a str, Vec<&'a str>)),
    Shift(usize),
    Accept,
}

impl LRParsingTableAction<'_> {
    pub fn to_plaintext(&self) -> String {
        match self {
            LRParsingTableAction::Reduce(r) => {
                format!("r({} -> {})", r.0, r.1.join(" "))
            }
            LRParsingTableAction::Shift(s) => {
                format!("s{}", s)
            }
            LRParsingTableAction::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, terminal_set: &HashSet<&str>) -> String {
        match self {
            LRParsingTableAction::Reduce(r) => {
                format!(
                    "reduce ${} \\rightarrow {}$",
                    escape::tex(r.0),
                    r.1.iter()
                        .map(|s| if terminal_set.contains(s) {
                            format!("\\text{{{}}}", escape::tex(*s))
                        } else {
                            escape::tex(*s).to_string()
                        })
                        .collect::<Vec<_>>()
                        .join(" \\  ")
                        .replace(EPSILON, "\\epsilon")
                )
            }
            LRParsingTableAction::Shift(s) => {
                format!("shift {}", s)
            }
            LRParsingTableAction::Accept => "accept".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct LRParsingTable<'a> {
    terminals: Vec<&'a str>,
    non_terminals: Vec<&'a str>,
    action: Vec<Vec<Vec<LRParsingTableAction<'a>>>>,
    goto: Vec<Vec<Option<usize>>>,
}

impl LRParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.to_string());
        }

        for (r1, r2) in self.action.iter().zip(self.goto.iter()) {
            let i = output.len() - 1;
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|actions| {
                    actions
                        .iter()
                        .map(|action| action.to_plaintext())
                        .collect::<Vec<_>>()
                        .join("; ")
                }))
                .chain(r2.iter().map(|goto| {
                    if let Some(goto) = goto {
                        goto.to_string()
                    } else {
                        String::new()
                    }
                }))
                .collect::<Vec<_>>();
            output.push(row);
        }

        align(&output)
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let mut first_row: Vec<String> = vec![String::new()];
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            first_row.push(escape::tex(*s).to_string());
        }
        let first_row = first_row.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();

        let content = self
            .action
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|actions| {
                        let r = actions
                            .iter()
                            .map(|action| action.to_latex(&terminal_set))
                            .collect::<Vec<_>>()
                            .join("; ");
                        if actions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", r)
                        } else {
                            r
                        }
                    }))
                    .chain(r2.iter().map(|goto| {
                        goto.map(|g| g.to_string()).unwrap_or_default()
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl SLR1Tables {
    /// Conflicting cells list every action that claimed them.
    pub fn to_output<'a>(&'a self, grammar: &'a Grammar) -> LRParsingTable<'a> {
        let columns = lookahead_columns(grammar);
        let to_action = |action: Action| match action {
            Action::Shift(s) => LRParsingTableAction::Shift(s),
            Action::Reduce(p) => {
                let production = grammar.production(p);
                LRParsingTableAction::Reduce((production.left.as_str(), production_rights(production)))
            }
            Action::Accept => LRParsingTableAction::Accept,
        };

        let action: Vec<Vec<Vec<LRParsingTableAction>>> = (0..self.state_count())
            .map(|u| {
                columns
                    .iter()
                    .map(|la| {
                        self.action(u, la)
                            .into_iter()
                            .chain(
                                self.conflicts()
                                    .iter()
                                    .filter(|c| c.state == u && &c.lookahead == la)
                                    .map(|c| c.rejected),
                            )
                            .map(&to_action)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let goto: Vec<Vec<Option<usize>>> = (0..self.state_count())
            .map(|u| grammar.non_terminal_iter().map(|nt| self.goto(u, nt)).collect())
            .collect();

        LRParsingTable {
            terminals: grammar
                .terminal_iter()
                .map(|t| t.as_str())
                .chain(std::iter::once(END_MARK))
                .collect(),
            non_terminals: grammar.non_terminal_iter().map(|nt| nt.as_str()).collect(),
            action,
            goto,
        }
    }
}

#[derive(Serialize)]
pub struct ParseTraceOutput<'a> {
    steps: &'a [ParseStep],
    outcome: &'a ParseOutcome,
}

impl<'a> ParseTraceOutput<'a> {
    pub fn new(steps: &'a [ParseStep], outcome: &'a ParseOutcome) -> Self {
        Self { steps, outcome }
    }

    pub fn to_plaintext(&self) -> String {
        let header = vec!["Stack".to_string(), "Input".to_string(), "Action".to_string()];
        let rows: Vec<Vec<String>> = std::iter::once(header)
            .chain(
                self.steps
                    .iter()
                    .map(|s| vec![s.stack.clone(), s.input.clone(), s.action.clone()]),
            )
            .collect();
        let verdict = match self.outcome {
            ParseOutcome::Accept => "accepted".to_string(),
            ParseOutcome::Reject(e) => format!("rejected: {}", e),
        };
        format!("{}\n{}", align(&rows), verdict)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .steps
            .iter()
            .map(|s| {
                format!(
                    "{} & {} & {}",
                    escape::tex(s.stack.as_str()),
                    escape::tex(s.input.as_str()),
                    escape::tex(s.action.as_str()).replace(EPSILON, "$\\epsilon$")
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");
        "\\begin{tabular}{r|r|l}\n".to_string()
            + "Stack & Input & Action\\\\\\hline\n"
            + &content
            + "\n\\end{tabular}"
    }
}

impl ClassificationResult {
    pub fn to_plaintext(&self, grammar: &Grammar) -> String {
        let mut lines = vec![format!("Grammar is {}.", self.class)];
        for c in &self.ll1_conflicts {
            lines.push(format!(
                "LL(1) conflict at [{}, {}]: {} / {}",
                c.non_terminal, c.lookahead, c.existing, c.rejected
            ));
        }
        for c in &self.slr1_conflicts {
            lines.push(format!(
                "SLR(1) {} conflict in state {} on {}: {} / {}",
                c.kind,
                c.state,
                c.lookahead,
                c.existing.to_plaintext(grammar),
                c.rejected.to_plaintext(grammar)
            ));
        }
        lines.join("\n")
    }

    /// The class as a sentence, then one table row per conflict.
    pub fn to_latex(&self, grammar: &Grammar) -> String {
        fn production(p: &Production) -> String {
            let right = p
                .right
                .iter()
                .map(|s| match s {
                    Symbol::Epsilon => "\\epsilon".to_string(),
                    Symbol::Terminal(t) => format!("\\text{{{}}}", escape::tex(t.as_str())),
                    s => escape::tex(s.name()).to_string(),
                })
                .collect::<Vec<_>>()
                .join(" \\ ");
            format!("${} \\rightarrow {}$", escape::tex(p.left.as_str()), right)
        }

        let action = |a: &Action| match a {
            Action::Shift(s) => format!("shift {}", s),
            Action::Reduce(p) => format!("reduce {}", production(grammar.production(*p))),
            Action::Accept => "accept".to_string(),
        };

        let verdict = format!("Grammar is {}.", escape::tex(self.class.to_string()));
        if self.ll1_conflicts.is_empty() && self.slr1_conflicts.is_empty() {
            return verdict;
        }

        let rows = self
            .ll1_conflicts
            .iter()
            .map(|c| {
                format!(
                    "LL(1) & [{}, {}] & {} & {}",
                    escape::tex(c.non_terminal.as_str()),
                    escape::tex(c.lookahead.name()),
                    production(&c.existing),
                    production(&c.rejected)
                )
            })
            .chain(self.slr1_conflicts.iter().map(|c| {
                format!(
                    "SLR(1) {} & [{}, {}] & {} & {}",
                    c.kind,
                    c.state,
                    escape::tex(c.lookahead.name()),
                    action(&c.existing),
                    action(&c.rejected)
                )
            }))
            .collect::<Vec<_>>()
            .join("\\\\\n");

        verdict
            + "\n\n\\begin{tabular}{l|l|l|l}\n"
            + "Conflict & Cell & Kept & Rejected\\\\\\hline\n"
            + &rows
            + "\n\\end{tabular}"
    }
}
