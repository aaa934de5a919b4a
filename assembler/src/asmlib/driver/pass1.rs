//! Pass 1 assigns an address to every statement, builds the symbol
//! and literal tables of each section, and works out the values of
//! `EQU` symbols.
use tracing::{Level, event, span};

use base::prelude::{Address, IndexBy};

use super::super::ast::{LocatedToken, Operation, Token};
use super::super::catalog::Catalog;
use super::super::constant::{Constant, parse_decimal};
use super::super::diagnostics::{DiagnosticKind, Diagnostics};
use super::super::directive::Directive;
use super::super::expr::{Expression, ExpressionError};
use super::super::littab::LiteralPool;
use super::super::section::{DEFAULT_SECTION_NAME, Section, SectionRegistry};
use super::super::types::LineNumber;

enum Flow {
    Continue,
    Stop,
}

/// The state of the first pass.  Completed sections are kept in
/// `sections`; the one being assembled is `building`, whose index
/// will be `current`.
struct Pass1<'a> {
    catalog: &'a Catalog,
    diagnostics: &'a mut Diagnostics,
    sections: SectionRegistry,
    building: Section,
    current: usize,
    locctr: Address,
    ended: bool,
    /// `EQU` statements as (section index, statement index).
    deferred_equ: Vec<(usize, usize)>,
}

fn literal_size(text: &str) -> u32 {
    Constant::parse_literal(text).map_or(0, |c| c.size())
}

impl<'a> Pass1<'a> {
    fn new(catalog: &'a Catalog, diagnostics: &'a mut Diagnostics) -> Pass1<'a> {
        Pass1 {
            catalog,
            diagnostics,
            sections: SectionRegistry::new(),
            building: Section::new(DEFAULT_SECTION_NAME, Address::ZERO),
            current: 0,
            locctr: Address::ZERO,
            ended: false,
            deferred_equ: Vec::new(),
        }
    }

    fn report(&mut self, line: LineNumber, kind: DiagnosticKind) {
        self.diagnostics.report(line, self.current, kind);
    }

    fn define(&mut self, name: &str, address: Address, line: LineNumber) {
        if let Err(e) = self.building.symbols.define(name, address) {
            self.report(
                line,
                DiagnosticKind::SymbolRedefined {
                    name: e.name,
                    existing: e.existing,
                },
            );
        }
    }

    fn flush_literals(&mut self, pool: LiteralPool) -> Address {
        self.building.literals.flush(self.locctr, pool, literal_size)
    }

    /// Place any pending literals and fix the section's length.
    fn close_section(&mut self) {
        self.locctr = self.flush_literals(LiteralPool::EndOfSection);
        self.building.length = self.locctr.bytes_since(self.building.start);
        event!(
            Level::DEBUG,
            "section {} starts at {:X} and has length {:X}",
            self.building.name,
            self.building.start,
            self.building.length
        );
    }

    fn start(&mut self, token: &Token) -> Address {
        if self.current != 0 || !self.building.tokens.is_empty() {
            self.report(token.line, DiagnosticKind::MisplacedStart);
            return self.locctr;
        }
        let start = match token.operand(0) {
            None => Address::ZERO,
            Some(text) => match u32::from_str_radix(text, 16)
                .ok()
                .and_then(|n| Address::try_from(n).ok())
            {
                Some(a) => a,
                None => {
                    self.report(
                        token.line,
                        DiagnosticKind::BadNumber {
                            text: text.to_string(),
                        },
                    );
                    Address::ZERO
                }
            },
        };
        self.building.name = token
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_SECTION_NAME.to_string());
        self.building.start = start;
        self.locctr = start;
        if let Some(label) = &token.label {
            self.define(label, start, token.line);
        }
        start
    }

    fn csect(&mut self, token: &Token) {
        self.close_section();
        let name = token
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_SECTION_NAME.to_string());
        let finished = std::mem::replace(&mut self.building, Section::new(&name, Address::ZERO));
        self.current = self.sections.open(finished) + 1;
        self.locctr = Address::ZERO;
        if let Some(label) = &token.label {
            self.define(label, Address::ZERO, token.line);
        }
    }

    /// The operand of RESW or RESB.
    fn count(&mut self, token: &Token, directive: Directive) -> u32 {
        match token.operand(0) {
            None => {
                self.report(
                    token.line,
                    DiagnosticKind::MissingOperand {
                        operation: directive.to_string(),
                    },
                );
                0
            }
            Some(text) => match parse_decimal(text).and_then(|n| u32::try_from(n).ok()) {
                Some(n) => n,
                None => {
                    self.report(
                        token.line,
                        DiagnosticKind::BadNumber {
                            text: text.to_string(),
                        },
                    );
                    0
                }
            },
        }
    }

    fn byte_size(&mut self, token: &Token) -> u32 {
        match token.operand(0).map(Constant::parse) {
            None => {
                self.report(
                    token.line,
                    DiagnosticKind::MissingOperand {
                        operation: Directive::Byte.to_string(),
                    },
                );
                0
            }
            Some(Ok(constant)) => constant.size(),
            Some(Err(e)) => {
                self.report(
                    token.line,
                    DiagnosticKind::BadConstant {
                        text: e.text,
                        reason: e.reason.to_string(),
                    },
                );
                0
            }
        }
    }

    fn instruction_length(&self, mnemonic: &str, extended: bool) -> u32 {
        match self.catalog.lookup(mnemonic) {
            Some(spec) if extended && spec.format.length() == 3 => 4,
            Some(spec) => spec.format.length(),
            None => 0,
        }
    }

    fn register_literals(&mut self, token: &Token) {
        for operand in token.operands.iter().filter(|op| op.starts_with('=')) {
            if self.building.literals.register(operand) {
                if let Err(e) = Constant::parse_literal(operand) {
                    self.report(
                        token.line,
                        DiagnosticKind::BadConstant {
                            text: e.text,
                            reason: e.reason.to_string(),
                        },
                    );
                }
            }
        }
    }

    fn statement(&mut self, token: Token) -> Flow {
        match token.directive() {
            Some(Directive::Start) => {
                let location = self.start(&token);
                self.building.tokens.push(LocatedToken { location, token });
                return Flow::Continue;
            }
            Some(Directive::Csect) => {
                self.csect(&token);
                self.building.tokens.push(LocatedToken {
                    location: Address::ZERO,
                    token,
                });
                return Flow::Continue;
            }
            _ => (),
        }

        let location = self.locctr;
        let line = token.line;
        self.register_literals(&token);
        if let Some(label) = &token.label {
            if !token.is_directive(Directive::Equ) {
                self.define(label, location, line);
            }
        }

        let index = self.building.tokens.len();
        let mut flow = Flow::Continue;
        let next = match &token.operation {
            None => {
                event!(Level::DEBUG, "line {line}: statement has no operator");
                location
            }
            Some(Operation::Instruction(mnemonic)) => {
                location.index_by(self.instruction_length(mnemonic, token.extended))
            }
            Some(Operation::Directive(d)) => match d {
                Directive::Word => location.index_by(3_u32),
                Directive::Resw => {
                    let n = self.count(&token, *d);
                    location.index_by(n.saturating_mul(3))
                }
                Directive::Resb => {
                    let n = self.count(&token, *d);
                    location.index_by(n)
                }
                Directive::Byte => {
                    let n = self.byte_size(&token);
                    location.index_by(n)
                }
                Directive::Ltorg => self.flush_literals(LiteralPool::At(index)),
                Directive::End => {
                    flow = Flow::Stop;
                    self.flush_literals(LiteralPool::At(index))
                }
                Directive::Extdef => {
                    for name in token.operands.iter().filter(|n| !n.is_empty()) {
                        self.building.add_extdef(name);
                    }
                    location
                }
                Directive::Extref => {
                    for name in token.operands.iter().filter(|n| !n.is_empty()) {
                        self.building.add_extref(name);
                    }
                    location
                }
                Directive::Equ => {
                    if token.label.is_some() {
                        self.deferred_equ.push((self.current, index));
                    } else {
                        self.report(
                            line,
                            DiagnosticKind::MissingLabel {
                                operation: d.to_string(),
                            },
                        );
                    }
                    location
                }
                Directive::Base | Directive::NoBase | Directive::Start | Directive::Csect => {
                    location
                }
            },
        };
        self.building.tokens.push(LocatedToken { location, token });
        self.locctr = next;
        if let Flow::Stop = flow {
            self.close_section();
            self.ended = true;
        }
        flow
    }

    fn finish(mut self) -> SectionRegistry {
        if !self.ended {
            event!(Level::DEBUG, "no END statement");
            self.close_section();
        }
        let Pass1 {
            diagnostics,
            mut sections,
            building,
            deferred_equ,
            ..
        } = self;
        sections.open(building);
        resolve_equ(&mut sections, &deferred_equ, diagnostics);
        sections
    }
}

/// Give each `EQU` label its value.  This happens after all
/// statements have been seen, so that an `EQU` may refer to symbols
/// defined later in its section.
fn resolve_equ(
    sections: &mut SectionRegistry,
    deferred: &[(usize, usize)],
    diagnostics: &mut Diagnostics,
) {
    for &(section_index, token_index) in deferred {
        let Some(section) = sections.get_mut(section_index) else {
            continue;
        };
        let Some(located) = section.tokens.get(token_index) else {
            continue;
        };
        let line = located.token.line;
        let location = located.location;
        let (Some(label), operand) = (located.token.label.clone(), located.token.operand(0))
        else {
            continue;
        };
        let Some(text) = operand.map(str::to_string) else {
            diagnostics.report(
                line,
                section_index,
                DiagnosticKind::MissingOperand {
                    operation: Directive::Equ.to_string(),
                },
            );
            continue;
        };
        let value = Expression::parse(&text).and_then(|e| e.evaluate(location, &*section));
        match value {
            Ok(v) => {
                let address = Address::from_signed(v);
                event!(Level::TRACE, "{label} EQU {text} = {address:X}");
                if let Err(e) = section.symbols.define(&label, address) {
                    diagnostics.report(
                        line,
                        section_index,
                        DiagnosticKind::SymbolRedefined {
                            name: e.name,
                            existing: e.existing,
                        },
                    );
                }
            }
            Err(ExpressionError::Undefined(names)) => {
                for name in names {
                    diagnostics.report(line, section_index, DiagnosticKind::UndefinedSymbol { name });
                }
            }
            Err(ExpressionError::Unsupported(text)) => {
                diagnostics.report(
                    line,
                    section_index,
                    DiagnosticKind::UnsupportedExpression { text },
                );
            }
        }
    }
}

pub(crate) fn assign_addresses(
    tokens: Vec<Token>,
    catalog: &Catalog,
    diagnostics: &mut Diagnostics,
) -> SectionRegistry {
    let span = span!(Level::INFO, "pass 1");
    let _enter = span.enter();
    let mut pass = Pass1::new(catalog, diagnostics);
    let mut tokens = tokens.into_iter();
    for token in tokens.by_ref() {
        if let Flow::Stop = pass.statement(token) {
            break;
        }
    }
    let ignored = tokens.count();
    if ignored > 0 {
        event!(Level::DEBUG, "ignoring {ignored} statement(s) after END");
    }
    let sections = pass.finish();
    event!(Level::DEBUG, "pass 1 found {} section(s)", sections.len());
    sections
}
