use base::prelude::Address;

use super::super::diagnostics::{DiagnosticKind, Severity};
use super::super::listing::{LiteralListing, SymbolListing};
use super::super::littab::LiteralPool;
use super::super::records::{FieldWidth, Record, Sign};
use super::*;

fn assemble(source: &str) -> Assembly {
    assemble_source(source, &Catalog::standard(), &AssemblyOptions::default())
        .expect("lenient assembly should not fail")
}

fn object_lines(assembly: &Assembly) -> Vec<String> {
    assembly
        .object
        .to_string()
        .lines()
        .map(str::to_string)
        .collect()
}

fn symbol(assembly: &Assembly, section: usize, name: &str) -> Option<Address> {
    assembly
        .sections
        .get(section)
        .and_then(|s| s.symbols().lookup(name))
}

#[test]
fn test_minimal_program() {
    let assembly = assemble(concat!(
        "COPY    START   0\n",
        "FIRST   STL     RETADR\n",
        "RETADR  RESW    1\n",
        "        END     FIRST\n",
    ));
    assert!(assembly.diagnostics.is_empty());
    assert_eq!(
        object_lines(&assembly),
        vec!["HCOPY  000000000006", "T00000003172000", "E000000"]
    );
}

#[test]
fn test_length_is_closing_counter_minus_start() {
    let assembly = assemble(concat!(
        "PROG    START   100\n",
        "        LDA     #1\n",
        "        +LDB    #2\n",
        "        CLEAR   A\n",
        "        FIX\n",
        "        WORD    7\n",
        "        RESW    2\n",
        "        RESB    5\n",
        "        BYTE    C'AB'\n",
        "        BYTE    X'F'\n",
        "        BYTE    9\n",
        "        END\n",
    ));
    let section = assembly.sections.get(0).expect("one section");
    assert_eq!(section.start(), Address::new(0x100));
    assert_eq!(section.length(), 3 + 4 + 2 + 1 + 3 + 6 + 5 + 2 + 1 + 3);
}

#[test]
fn test_default_section() {
    let assembly = assemble("        LDA     #5\n        END\n");
    let section = assembly.sections.get(0).expect("one section");
    assert_eq!(section.name(), "NONAME");
    assert_eq!(
        object_lines(&assembly),
        vec!["HNONAME000000000003", "T00000003010005", "E"]
    );
}

#[test]
fn test_literal_pools() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        LDA     =C'EOF'\n",
        "        LDA     =X'05'\n",
        "        LTORG\n",
        "        LDA     =C'EOF'\n",
        "        LDA     =10\n",
        "        END\n",
    ));
    let section = assembly.sections.get(0).expect("one section");
    let literals = section.literals();
    assert_eq!(literals.address_of("=C'EOF'"), Some(Address::new(6)));
    assert_eq!(literals.address_of("=X'05'"), Some(Address::new(9)));
    // The second use of =C'EOF' refers to the first pool.
    assert_eq!(literals.address_of("=10"), Some(Address::new(16)));
    assert_eq!(literals.placement("=10").map(|p| p.pool), Some(LiteralPool::At(6)));
    assert_eq!(section.length(), 19);
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HP     000000000013",
            "T00000006032003032003",
            "T00000604454F4605",
            "T00000A06032FF9032000",
            "T0000100300000A",
            "E",
        ]
    );
}

#[test]
fn test_equ() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "HERE    EQU     *\n",
        "BUFFER  RESB    16\n",
        "BUFEND  EQU     *\n",
        "MAXLEN  EQU     BUFEND-BUFFER\n",
        "LATER   EQU     AFTER\n",
        "TEN     EQU     10\n",
        "AFTER   WORD    0\n",
        "BAD     EQU     NOWHERE-BUFFER\n",
        "        END\n",
    ));
    assert_eq!(symbol(&assembly, 0, "HERE"), Some(Address::ZERO));
    assert_eq!(symbol(&assembly, 0, "BUFEND"), Some(Address::new(16)));
    assert_eq!(symbol(&assembly, 0, "MAXLEN"), Some(Address::new(16)));
    assert_eq!(symbol(&assembly, 0, "LATER"), Some(Address::new(16)));
    assert_eq!(symbol(&assembly, 0, "TEN"), Some(Address::new(10)));
    assert_eq!(symbol(&assembly, 0, "BAD"), None);
    assert_eq!(
        assembly
            .diagnostics
            .iter()
            .map(|d| (d.line, d.kind.clone()))
            .collect::<Vec<_>>(),
        vec![(
            9,
            DiagnosticKind::UndefinedSymbol {
                name: "NOWHERE".to_string()
            }
        )]
    );
}

#[test]
fn test_pc_relative_upper_limit() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        LDA     TARGET\n",
        "        RESB    2047\n",
        "TARGET  WORD    1\n",
        "        END\n",
    ));
    assert_eq!(object_lines(&assembly)[1], "T000000030327FF");
    assert!(assembly.diagnostics.is_empty());
}

#[test]
fn test_beyond_pc_range_uses_base() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        BASE    TARGET\n",
        "        LDA     TARGET\n",
        "        RESB    2048\n",
        "TARGET  WORD    1\n",
        "        END\n",
    ));
    assert_eq!(object_lines(&assembly)[1], "T00000003034000");
    assert!(assembly.diagnostics.is_empty());
}

#[test]
fn test_out_of_range_is_zero_filled() {
    let source = concat!(
        "P       START   0\n",
        "        LDA     TARGET\n",
        "        RESB    2048\n",
        "TARGET  WORD    1\n",
        "        END\n",
    );
    let assembly = assemble(source);
    assert_eq!(object_lines(&assembly)[1], "T00000003030000");
    assert_eq!(assembly.diagnostics.len(), 1);
    assert_eq!(assembly.diagnostics[0].line, 2);
    assert!(matches!(
        assembly.diagnostics[0].kind,
        DiagnosticKind::DisplacementOutOfRange { .. }
    ));

    let strict = assemble_source(
        source,
        &Catalog::standard(),
        &AssemblyOptions { strict: true },
    );
    match strict {
        Err(AssemblerFailure::StrictModeViolation(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
        }
        other => panic!("expected strict mode failure, got {other:?}"),
    }
}

#[test]
fn test_addressing_flags() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        LDA     @PTR\n",
        "        LDA     #PTR\n",
        "        STCH    PTR,X\n",
        "        +LDA    PTR\n",
        "        +LDT    #4096\n",
        "        RSUB\n",
        "PTR     WORD    0\n",
        "        END\n",
    ));
    // PTR is at 3+3+3+4+4+3 = 0x14.
    assert_eq!(
        object_lines(&assembly)[1],
        "T0000001702201101200E57A00B03100014751010004F0000000000"
    );
}

#[test]
fn test_format2() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        COMPR   A,S\n",
        "        TIXR    T\n",
        "        SHIFTL  T,4\n",
        "        SVC     5\n",
        "        RMO     A,Q\n",
        "        END\n",
    ));
    assert_eq!(object_lines(&assembly)[1], "T0000000AA004B850A453B050AC00");
    assert_eq!(assembly.diagnostics.len(), 1);
    assert_eq!(assembly.diagnostics[0].severity, Severity::Error);
    assert_eq!(
        assembly.diagnostics[0].kind,
        DiagnosticKind::UnknownRegister {
            name: "Q".to_string()
        }
    );
}

#[test]
fn test_control_sections() {
    let assembly = assemble(concat!(
        "PROGA   START   0\n",
        "        EXTDEF  LISTA,ENDA\n",
        "        EXTREF  LISTB\n",
        "FIRST   +LDA    LISTB\n",
        "LISTA   WORD    5\n",
        "ENDA    EQU     *\n",
        "PROGB   CSECT\n",
        "        EXTREF  LISTA,ENDA\n",
        "        EXTDEF  LISTB\n",
        "LISTB   +STA    LISTA\n",
        "REF     WORD    ENDA-LISTA\n",
        "        END     FIRST\n",
    ));
    assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    assert_eq!(assembly.sections.len(), 2);
    assert_eq!(symbol(&assembly, 0, "ENDA"), Some(Address::new(7)));
    assert_eq!(symbol(&assembly, 1, "PROGB"), Some(Address::ZERO));
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HPROGA 000000000007",
            "DLISTA 000004ENDA  000007",
            "RLISTB ",
            "T0000000703100000000005",
            "M00000105+LISTB",
            "E000000",
            "",
            "HPROGB 000000000007",
            "DLISTB 000000",
            "RLISTA ENDA  ",
            "T000000070F100000000000",
            "M00000105+LISTA",
            "M00000406+ENDA",
            "M00000406-LISTA",
            "E",
        ]
    );
    let sections = &assembly.object.sections;
    assert_eq!(
        sections[1][4],
        Record::Modification {
            address: Address::new(1),
            width: FieldWidth::Address,
            sign: Sign::Plus,
            symbol: "LISTA".to_string(),
        }
    );
}

#[test]
fn test_records_use_section_offsets() {
    let assembly = assemble(concat!(
        "COPY    START   1000\n",
        "FIRST   STL     RETADR\n",
        "RETADR  RESW    1\n",
        "        END     FIRST\n",
    ));
    assert!(assembly.diagnostics.is_empty());
    assert_eq!(
        object_lines(&assembly),
        vec!["HCOPY  001000000006", "T00000003172000", "E001000"]
    );

    let assembly = assemble(concat!(
        "P       START   1000\n",
        "        EXTREF  EXT\n",
        "        +JSUB   EXT\n",
        "        END\n",
    ));
    assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HP     001000000004",
            "REXT   ",
            "T000000044B100000",
            "M00000105+EXT",
            "E",
        ]
    );
}

#[test]
fn test_external_literal_is_modified() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        EXTREF  =X'05'\n",
        "        LDA     =X'05'\n",
        "        END\n",
    ));
    assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HP     000000000004",
            "R=X'05'",
            "T00000003032000",
            "T0000030105",
            "M00000005+=X'05'",
            "E",
        ]
    );
}

#[test]
fn test_equ_difference_of_externals_is_modified() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        EXTREF  X1,X2\n",
        "FIRST   WORD    1\n",
        "SECOND  WORD    2\n",
        "DIFF    EQU     X1-X2\n",
        "        END\n",
    ));
    assert!(assembly.diagnostics.is_empty(), "{:?}", assembly.diagnostics);
    assert_eq!(symbol(&assembly, 0, "DIFF"), Some(Address::ZERO));
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HP     000000000006",
            "RX1    X2    ",
            "T00000006000001000002",
            "M00000006+X1",
            "M00000006-X2",
            "E",
        ]
    );
}

#[test]
fn test_csect_flushes_literals() {
    let assembly = assemble(concat!(
        "A       START   0\n",
        "        LDA     =X'01'\n",
        "B       CSECT\n",
        "        LDA     =X'01'\n",
        "        END\n",
    ));
    let a = assembly.sections.get(0).expect("section A");
    let b = assembly.sections.get(1).expect("section B");
    assert_eq!(a.literals().address_of("=X'01'"), Some(Address::new(3)));
    assert_eq!(a.length(), 4);
    assert_eq!(b.literals().address_of("=X'01'"), Some(Address::new(3)));
    assert_eq!(
        object_lines(&assembly),
        vec![
            "HA     000000000004",
            "T00000003032000",
            "T0000030101",
            "E",
            "",
            "HB     000000000004",
            "T00000003032000",
            "T0000030101",
            "E",
        ]
    );
}

#[test]
fn test_redefinition_keeps_first() {
    let source = concat!(
        "P       START   0\n",
        "X1      WORD    1\n",
        "X1      WORD    2\n",
        "        END\n",
    );
    let assembly = assemble(source);
    assert_eq!(symbol(&assembly, 0, "X1"), Some(Address::ZERO));
    assert_eq!(
        assembly.diagnostics[0].kind,
        DiagnosticKind::SymbolRedefined {
            name: "X1".to_string(),
            existing: Address::ZERO
        }
    );
    assert!(assemble_source(
        source,
        &Catalog::standard(),
        &AssemblyOptions { strict: true }
    )
    .is_err());
}

#[test]
fn test_undefined_operand_is_zero() {
    let assembly = assemble("P       START   0\n        +J      NOWHERE\n        END\n");
    assert_eq!(object_lines(&assembly)[1], "T000000043F100000");
    assert_eq!(
        assembly.diagnostics[0].kind,
        DiagnosticKind::UndefinedSymbol {
            name: "NOWHERE".to_string()
        }
    );
}

#[test]
fn test_lines_after_end_are_ignored() {
    let assembly = assemble(concat!(
        "P       START   0\n",
        "        FIX\n",
        "        END\n",
        "        FLOAT\n",
    ));
    assert_eq!(assembly.sections.get(0).map(|s| s.length()), Some(1));
    assert_eq!(object_lines(&assembly)[1], "T00000001C4");
}

#[test]
fn test_comments_and_unknown_operators() {
    let assembly = assemble(concat!(
        ". a comment line\n",
        "\n",
        "P       START   0   . program start\n",
        "ODD     FROB    1\n",
        "        FIX\n",
        "        END\n",
    ));
    assert!(assembly.diagnostics.is_empty());
    // A statement with an unknown operator still defines its label.
    assert_eq!(symbol(&assembly, 0, "ODD"), Some(Address::ZERO));
    assert_eq!(object_lines(&assembly)[1], "T00000001C4");
}

#[test]
fn test_misplaced_start() {
    let assembly = assemble(concat!(
        "A       START   0\n",
        "B       CSECT\n",
        "C       START   100\n",
        "        FIX\n",
        "        END\n",
    ));
    assert_eq!(assembly.diagnostics.len(), 1);
    assert_eq!(assembly.diagnostics[0].kind, DiagnosticKind::MisplacedStart);
    assert_eq!(assembly.diagnostics[0].severity, Severity::Warning);
    assert_eq!(assembly.diagnostics[0].section, 1);
    // Warnings do not make strict mode fail.
    assert!(assemble_source(
        "A START 0\nB CSECT\nC START 100\n FIX\n END\n",
        &Catalog::standard(),
        &AssemblyOptions { strict: true }
    )
    .is_ok());
}

#[test]
fn test_bad_entry_point() {
    let assembly = assemble("P       START   1000\n        FIX\n        END     NOPE\n");
    assert_eq!(object_lines(&assembly).last().map(String::as_str), Some("E001000"));
    assert_eq!(
        assembly.diagnostics[0].kind,
        DiagnosticKind::BadEntryPoint {
            name: "NOPE".to_string()
        }
    );
}

#[test]
fn test_listings() {
    let assembly = assemble(concat!(
        "A       START   0\n",
        "FIRST   LDA     =C'Z'\n",
        "B       CSECT\n",
        "SECOND  FIX\n",
        "        END\n",
    ));
    assert_eq!(
        SymbolListing(&assembly.sections).to_string(),
        "A          0\nFIRST      0\n\nB          0\nSECOND     0\n"
    );
    assert_eq!(
        LiteralListing(&assembly.sections).to_string(),
        "=C'Z'      3\n\n"
    );
}
