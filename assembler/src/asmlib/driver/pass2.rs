//! Pass 2 generates the object program.  It reads the sections built
//! by pass 1 but does not change them.
use tracing::{Level, event, span};

use base::prelude::{
    Address, Displacement, Flags, Format, IndexBy, MachineInstruction, Register,
};

use super::super::addressing::{AddressingError, MemoryOperand, encode_extended, encode_relative};
use super::super::ast::{LocatedToken, OperandSyntax, Operation};
use super::super::catalog::{Catalog, InstructionSpec};
use super::super::constant::{Constant, parse_decimal, word_bytes};
use super::super::diagnostics::{DiagnosticKind, Diagnostics};
use super::super::directive::Directive;
use super::super::expr::{Expression, ExpressionError, Resolution, SymbolLookup, signed_terms};
use super::super::littab::LiteralPool;
use super::super::records::{FieldWidth, ObjectProgram, Record, Sign, TextRecordBuilder};
use super::super::section::{Section, SectionRegistry};
use super::super::types::LineNumber;

/// True for statements which generate object code.
fn is_text_recordable(located: &LocatedToken) -> bool {
    match &located.token.operation {
        Some(Operation::Instruction(_)) => true,
        Some(Operation::Directive(d)) => matches!(d, Directive::Byte | Directive::Word),
        None => false,
    }
}

/// The operand of the `END` statement, which names the entry point.
fn entry_point(sections: &SectionRegistry) -> Option<(&str, LineNumber)> {
    sections
        .iter()
        .flat_map(|s| s.tokens.iter())
        .filter(|t| t.token.is_directive(Directive::End))
        .find_map(|t| t.token.operand(0).map(|name| (name, t.token.line)))
}

struct SectionGenerator<'a> {
    index: usize,
    section: &'a Section,
    catalog: &'a Catalog,
    diagnostics: &'a mut Diagnostics,
    base: Option<Address>,
    text: TextRecordBuilder,
    records: Vec<Record>,
    modifications: Vec<Record>,
}

impl<'a> SectionGenerator<'a> {
    fn new(
        index: usize,
        section: &'a Section,
        catalog: &'a Catalog,
        diagnostics: &'a mut Diagnostics,
    ) -> SectionGenerator<'a> {
        SectionGenerator {
            index,
            section,
            catalog,
            diagnostics,
            base: None,
            text: TextRecordBuilder::default(),
            records: Vec::new(),
            modifications: Vec::new(),
        }
    }

    fn report(&mut self, line: LineNumber, kind: DiagnosticKind) {
        self.diagnostics.report(line, self.index, kind);
    }

    /// Text and Modification records address the section from its start.
    fn offset(&self, location: Address) -> Address {
        Address::new(location.bytes_since(self.section.start))
    }

    fn has_content(&self) -> bool {
        !self.section.extdef.is_empty()
            || !self.section.extref.is_empty()
            || self.section.tokens.iter().any(is_text_recordable)
    }

    /// Value of `name` as an instruction or WORD operand.  External
    /// names are 0 (the loader adds their value); undefined names are
    /// also 0, but are reported.
    fn resolve(&mut self, name: &str, line: LineNumber) -> Address {
        match self.section.resolve(name) {
            Resolution::Local(address) => address,
            Resolution::External => Address::ZERO,
            Resolution::Undefined => {
                self.report(
                    line,
                    DiagnosticKind::UndefinedSymbol {
                        name: name.to_string(),
                    },
                );
                Address::ZERO
            }
        }
    }

    fn report_expression_error(&mut self, line: LineNumber, e: ExpressionError) {
        match e {
            ExpressionError::Undefined(names) => {
                for name in names {
                    self.report(line, DiagnosticKind::UndefinedSymbol { name });
                }
            }
            ExpressionError::Unsupported(text) => {
                self.report(line, DiagnosticKind::UnsupportedExpression { text });
            }
        }
    }

    /// The base register value is taken from the first `BASE`
    /// statement of the section, and applies to the whole section.
    fn find_base(&mut self) -> Option<Address> {
        let section = self.section;
        let located = section
            .tokens
            .iter()
            .find(|t| t.token.is_directive(Directive::Base))?;
        let line = located.token.line;
        let Some(text) = located.token.operand(0) else {
            self.report(
                line,
                DiagnosticKind::MissingOperand {
                    operation: Directive::Base.to_string(),
                },
            );
            return None;
        };
        match Expression::parse(text).and_then(|e| e.evaluate(located.location, section)) {
            Ok(v) => Some(Address::from_signed(v)),
            Err(e) => {
                self.report_expression_error(line, e);
                None
            }
        }
    }

    fn program_name(&self) -> String {
        self.section
            .tokens
            .first()
            .and_then(|t| t.token.label.clone())
            .unwrap_or_else(|| self.section.name.clone())
    }

    fn define_record(&mut self) -> Record {
        let section = self.section;
        let line = section
            .tokens
            .iter()
            .find(|t| t.token.is_directive(Directive::Extdef))
            .map_or(0, |t| t.token.line);
        let mut entries = Vec::with_capacity(section.extdef.len());
        for name in &section.extdef {
            let address = match section.symbols.lookup(name) {
                Some(address) => address,
                None => {
                    self.report(line, DiagnosticKind::UndefinedSymbol { name: name.clone() });
                    Address::ZERO
                }
            };
            entries.push((name.clone(), address));
        }
        Record::Define(entries)
    }

    /// Modification records for each external name in an expression.
    fn expression_modifications(&mut self, at: Address, text: &str) {
        for (sign, name) in signed_terms(text) {
            if self.section.is_external(name) {
                let address = self.offset(at);
                self.modifications.push(Record::Modification {
                    address,
                    width: FieldWidth::Word,
                    sign,
                    symbol: name.to_string(),
                });
            }
        }
    }

    fn emit_pool(&mut self, pool: LiteralPool) {
        let section = self.section;
        for (text, address) in section.literals.in_pool(pool) {
            // Bad literals were reported when first used.
            if let Ok(constant) = Constant::parse_literal(text) {
                let at = self.offset(address);
                self.text.append(at, &constant.to_bytes(), &mut self.records);
            }
        }
    }

    fn word(&mut self, located: &LocatedToken) -> Vec<u8> {
        let line = located.token.line;
        let Some(text) = located.token.operand(0) else {
            self.report(
                line,
                DiagnosticKind::MissingOperand {
                    operation: Directive::Word.to_string(),
                },
            );
            return word_bytes(0).to_vec();
        };
        let value = match Expression::parse(text)
            .and_then(|e| e.evaluate(located.location, self.section))
        {
            Ok(v) => v,
            Err(e) => {
                self.report_expression_error(line, e);
                0
            }
        };
        self.expression_modifications(located.location, text);
        word_bytes(value).to_vec()
    }

    fn register_number(&mut self, operand: Option<&str>, line: LineNumber) -> u8 {
        let Some(text) = operand else {
            return 0;
        };
        if let Ok(r) = text.parse::<Register>() {
            return r.number();
        }
        // SVC takes a number rather than a register.
        if let Some(n) = parse_decimal(text).and_then(|n| u8::try_from(n).ok()).filter(|n| *n < 16) {
            return n;
        }
        self.report(
            line,
            DiagnosticKind::UnknownRegister {
                name: text.to_string(),
            },
        );
        0
    }

    fn format2(&mut self, located: &LocatedToken, spec: &InstructionSpec) -> MachineInstruction {
        let token = &located.token;
        let r1 = self.register_number(token.operand(0), token.line);
        let r2 = match spec.mnemonic.as_str() {
            // The shift count n is encoded as n-1.
            "SHIFTL" | "SHIFTR" => match token.operand(1) {
                None => 0,
                Some(text) => match parse_decimal(text).filter(|n| (1..=16).contains(n)) {
                    Some(n) => u8::try_from(n - 1).unwrap_or(0),
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
            },
            _ => self.register_number(token.operand(1), token.line),
        };
        MachineInstruction::Format2 {
            opcode: spec.opcode,
            r1,
            r2,
        }
    }

    fn memory_reference(
        &mut self,
        located: &LocatedToken,
        spec: &InstructionSpec,
    ) -> MachineInstruction {
        let token = &located.token;
        let line = token.line;
        let location = located.location;
        let extended = token.extended;
        let opcode = spec.opcode;

        let operand = match token.operand(0) {
            Some(op) if spec.mnemonic != "RSUB" => op,
            _ => {
                return if extended {
                    MachineInstruction::Format4 {
                        opcode,
                        flags: Flags::SIMPLE,
                        address: 0,
                    }
                } else {
                    MachineInstruction::Format3 {
                        opcode,
                        flags: Flags::SIMPLE,
                        displacement: Displacement::ZERO,
                    }
                };
            }
        };

        let indexed = token
            .operand(1)
            .is_some_and(|op| op.eq_ignore_ascii_case("X"));
        let syntax = OperandSyntax::classify(operand);
        let (flags, target) = match syntax {
            OperandSyntax::Literal(text) => {
                if self.section.is_extref(text) {
                    let address = self.offset(location);
                    self.modifications.push(Record::Modification {
                        address,
                        width: FieldWidth::Address,
                        sign: Sign::Plus,
                        symbol: text.to_string(),
                    });
                }
                let target = match self.section.literals.address_of(text) {
                    Some(address) => address,
                    None => {
                        self.report(
                            line,
                            DiagnosticKind::UndefinedSymbol {
                                name: text.to_string(),
                            },
                        );
                        Address::ZERO
                    }
                };
                (Flags::SIMPLE, target)
            }
            OperandSyntax::Immediate(value) => {
                if let Some(k) = parse_decimal(value) {
                    return if extended {
                        MachineInstruction::Format4 {
                            opcode,
                            flags: Flags::IMMEDIATE,
                            address: Address::from_signed(k).value() & Address::MAX.value(),
                        }
                    } else {
                        MachineInstruction::Format3 {
                            opcode,
                            flags: Flags::IMMEDIATE,
                            displacement: Displacement::wrapping(k),
                        }
                    };
                }
                (Flags::IMMEDIATE, self.resolve(value, line))
            }
            OperandSyntax::Indirect(name) => (Flags::INDIRECT, self.resolve(name, line)),
            OperandSyntax::Simple(name) => (Flags::SIMPLE, self.resolve(name, line)),
        };
        let operand = MemoryOperand {
            flags: Flags { x: indexed, ..flags },
            target,
        };

        let encoded = if extended {
            if let OperandSyntax::Immediate(name)
            | OperandSyntax::Indirect(name)
            | OperandSyntax::Simple(name) = syntax
            {
                if self.section.is_extref(name) {
                    let address = self.offset(location).index_by(1_u32);
                    self.modifications.push(Record::Modification {
                        address,
                        width: FieldWidth::Address,
                        sign: Sign::Plus,
                        symbol: name.to_string(),
                    });
                }
            }
            encode_extended(opcode, operand)
        } else {
            encode_relative(opcode, operand, location, self.base)
        };
        match encoded {
            Ok(inst) => inst,
            Err(e) => {
                let kind = match e {
                    AddressingError::OutOfRange {
                        target, location, ..
                    } => DiagnosticKind::DisplacementOutOfRange { target, location },
                    AddressingError::TooLarge { target, .. } => {
                        DiagnosticKind::AddressTooLarge { target }
                    }
                };
                self.report(line, kind);
                e.degraded()
            }
        }
    }

    fn object_code(&mut self, located: &LocatedToken) -> Vec<u8> {
        match &located.token.operation {
            Some(Operation::Directive(Directive::Word)) => self.word(located),
            Some(Operation::Directive(Directive::Byte)) => located
                .token
                .operand(0)
                .and_then(|text| Constant::parse(text).ok())
                .map(|c| c.to_bytes())
                .unwrap_or_default(),
            Some(Operation::Instruction(mnemonic)) => {
                let catalog = self.catalog;
                let Some(spec) = catalog.lookup(mnemonic) else {
                    return Vec::new();
                };
                let inst = match spec.format {
                    Format::One => MachineInstruction::Format1 {
                        opcode: spec.opcode,
                    },
                    Format::Two => self.format2(located, spec),
                    Format::Three | Format::Four => self.memory_reference(located, spec),
                };
                event!(
                    Level::TRACE,
                    "{:X}: {} {:?} -> {inst}",
                    located.location,
                    mnemonic,
                    located.token.operands
                );
                inst.to_bytes()
            }
            _ => Vec::new(),
        }
    }

    fn end_record(&mut self, entry: Option<(&str, LineNumber)>) -> Record {
        if self.index != 0 {
            return Record::End(None);
        }
        match entry {
            None => Record::End(None),
            Some((name, line)) => match self.section.symbols.lookup(name) {
                Some(address) => Record::End(Some(address)),
                None => {
                    self.report(
                        line,
                        DiagnosticKind::BadEntryPoint {
                            name: name.to_string(),
                        },
                    );
                    Record::End(Some(self.section.start))
                }
            },
        }
    }

    fn generate(mut self, entry: Option<(&str, LineNumber)>) -> Option<Vec<Record>> {
        let section = self.section;
        if !self.has_content() {
            event!(
                Level::DEBUG,
                "section {} generates no object code",
                section.name
            );
            return None;
        }
        self.base = self.find_base();
        let name = self.program_name();
        self.records.push(Record::Header {
            name,
            start: section.start,
            length: section.length,
        });
        if !section.extdef.is_empty() {
            let define = self.define_record();
            self.records.push(define);
        }
        if !section.extref.is_empty() {
            self.records.push(Record::Refer(section.extref.clone()));
        }

        for (index, located) in section.tokens.iter().enumerate() {
            match located.token.directive() {
                Some(Directive::Ltorg) => {
                    self.text.flush(&mut self.records);
                    self.emit_pool(LiteralPool::At(index));
                    self.text.flush(&mut self.records);
                }
                Some(Directive::End) => {
                    self.text.flush(&mut self.records);
                    self.emit_pool(LiteralPool::At(index));
                    break;
                }
                Some(Directive::Equ) => {
                    if let Some(text) = located.token.operand(0) {
                        if text.contains('-') {
                            self.expression_modifications(located.location, text);
                        }
                    }
                }
                _ if is_text_recordable(located) => {
                    let bytes = self.object_code(located);
                    let at = self.offset(located.location);
                    self.text.append(at, &bytes, &mut self.records);
                }
                _ => (),
            }
        }
        self.text.flush(&mut self.records);
        self.emit_pool(LiteralPool::EndOfSection);
        self.text.flush(&mut self.records);

        let end = self.end_record(entry);
        let mut records = self.records;
        records.append(&mut self.modifications);
        records.push(end);
        Some(records)
    }
}

pub(crate) fn generate_code(
    sections: &SectionRegistry,
    catalog: &Catalog,
    diagnostics: &mut Diagnostics,
) -> ObjectProgram {
    let span = span!(Level::INFO, "pass 2");
    let _enter = span.enter();
    let entry = entry_point(sections);
    let mut program = ObjectProgram::default();
    for (index, section) in sections.iter().enumerate() {
        let generator = SectionGenerator::new(index, section, catalog, diagnostics);
        if let Some(records) = generator.generate(entry) {
            event!(
                Level::DEBUG,
                "section {} produced {} record(s)",
                section.name(),
                records.len()
            );
            program.sections.push(records);
        }
    }
    program
}
