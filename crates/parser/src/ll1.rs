//! LL(1) validation of the parser's decision tables.
//!
//! The recursive-descent parser commits to an alternative after peeking at a
//! single token. Each such decision point is mirrored here as a table of
//! alternatives with their FIRST sets; [`validate`] checks that the sets are
//! pairwise disjoint and that at most one alternative per decision is
//! nullable. The check runs once at parser construction, so a grammar edit
//! that silently breaks single-token lookahead aborts every parse with an
//! internal fatal diagnostic instead of misparsing.

use crate::lexer::Token;

pub struct Alternative {
    pub label: &'static str,
    pub first: &'static [Token],
    pub nullable: bool,
}

pub struct Decision {
    pub nonterminal: &'static str,
    pub alternatives: &'static [Alternative],
}

const SIMPLE_FIRST: &[Token] = &[
    Token::Number,
    Token::True,
    Token::False,
    Token::Str,
    Token::LParen,
    Token::ErrorKw,
    Token::Name,
];

const OP_EXPR_FIRST: &[Token] = &[
    Token::Minus,
    Token::Bang,
    Token::Number,
    Token::True,
    Token::False,
    Token::Str,
    Token::LParen,
    Token::ErrorKw,
    Token::Name,
];

const LV2_EXPR_FIRST: &[Token] = &[
    Token::If,
    Token::Minus,
    Token::Bang,
    Token::Number,
    Token::True,
    Token::False,
    Token::Str,
    Token::LParen,
    Token::ErrorKw,
    Token::Name,
];

const EXPR_FIRST: &[Token] = &[
    Token::Val,
    Token::If,
    Token::Minus,
    Token::Bang,
    Token::Number,
    Token::True,
    Token::False,
    Token::Str,
    Token::LParen,
    Token::ErrorKw,
    Token::Name,
];

pub static GRAMMAR: &[Decision] = &[
    Decision {
        nonterminal: "Def",
        alternatives: &[
            Alternative {
                label: "FunDef",
                first: &[Token::Def],
                nullable: false,
            },
            Alternative {
                label: "AbstractClassDef",
                first: &[Token::Abstract],
                nullable: false,
            },
            Alternative {
                label: "CaseClassDef",
                first: &[Token::Case],
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "ModuleItem",
        alternatives: &[
            Alternative {
                label: "Def",
                first: &[Token::Def, Token::Abstract, Token::Case],
                nullable: false,
            },
            Alternative {
                label: "Initializer",
                first: EXPR_FIRST,
                nullable: false,
            },
            Alternative {
                label: "ModuleEnd",
                first: &[Token::RBrace],
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Expr",
        alternatives: &[
            Alternative {
                label: "LetExpr",
                first: &[Token::Val],
                nullable: false,
            },
            Alternative {
                label: "SeqExpr",
                first: LV2_EXPR_FIRST,
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Lv2Expr",
        alternatives: &[
            Alternative {
                label: "IteExpr",
                first: &[Token::If],
                nullable: false,
            },
            Alternative {
                label: "OpExpr",
                first: OP_EXPR_FIRST,
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "UnaryExpr",
        alternatives: &[
            Alternative {
                label: "Negation",
                first: &[Token::Minus],
                nullable: false,
            },
            Alternative {
                label: "LogicalNot",
                first: &[Token::Bang],
                nullable: false,
            },
            Alternative {
                label: "Simple",
                first: SIMPLE_FIRST,
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Simple",
        alternatives: &[
            Alternative {
                label: "Literal",
                first: &[Token::Number, Token::True, Token::False, Token::Str],
                nullable: false,
            },
            Alternative {
                label: "UnitOrGrouping",
                first: &[Token::LParen],
                nullable: false,
            },
            Alternative {
                label: "ErrorExpr",
                first: &[Token::ErrorKw],
                nullable: false,
            },
            Alternative {
                label: "VarOrCall",
                first: &[Token::Name],
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Type",
        alternatives: &[
            Alternative {
                label: "Int",
                first: &[Token::IntType],
                nullable: false,
            },
            Alternative {
                label: "String",
                first: &[Token::StringType],
                nullable: false,
            },
            Alternative {
                label: "Boolean",
                first: &[Token::BooleanType],
                nullable: false,
            },
            Alternative {
                label: "Unit",
                first: &[Token::UnitType],
                nullable: false,
            },
            Alternative {
                label: "ClassType",
                first: &[Token::Name],
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Pattern",
        alternatives: &[
            Alternative {
                label: "LiteralPattern",
                first: &[Token::Number, Token::True, Token::False, Token::Str],
                nullable: false,
            },
            Alternative {
                label: "UnitPattern",
                first: &[Token::LParen],
                nullable: false,
            },
            Alternative {
                label: "Wildcard",
                first: &[Token::Underscore],
                nullable: false,
            },
            Alternative {
                label: "IdOrCaseClass",
                first: &[Token::Name],
                nullable: false,
            },
        ],
    },
    Decision {
        nonterminal: "Params",
        alternatives: &[
            Alternative {
                label: "ParamList",
                first: &[Token::Name],
                nullable: false,
            },
            Alternative {
                label: "Empty",
                first: &[],
                nullable: true,
            },
        ],
    },
    Decision {
        nonterminal: "Args",
        alternatives: &[
            Alternative {
                label: "ArgList",
                first: EXPR_FIRST,
                nullable: false,
            },
            Alternative {
                label: "Empty",
                first: &[],
                nullable: true,
            },
        ],
    },
];

/// Check every decision table for single-token-lookahead ambiguity.
pub fn validate() -> Result<(), String> {
    for decision in GRAMMAR {
        let mut nullable: Option<&'static str> = None;
        for (i, alt) in decision.alternatives.iter().enumerate() {
            if alt.nullable {
                if let Some(prev) = nullable {
                    return Err(format!(
                        "grammar is not LL(1): alternatives '{}' and '{}' of {} are both nullable",
                        prev, alt.label, decision.nonterminal
                    ));
                }
                nullable = Some(alt.label);
            }
            for other in &decision.alternatives[i + 1..] {
                if let Some(token) = alt.first.iter().find(|t| other.first.contains(t)) {
                    return Err(format!(
                        "grammar is not LL(1): {} cannot decide between '{}' and '{}' on {:?}",
                        decision.nonterminal, alt.label, other.label, token
                    ));
                }
            }
        }
    }
    Ok(())
}
