//! Opcode signatures of `JndiManager` methods per log4j-core release.
//!
//! Exact rules must equal a whole method's opcode stream. Partial rules pin
//! down the leading and trailing opcodes of a method whose middle depends on
//! the compiler that built it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactMatchRule {
    pub versions: &'static [&'static str],
    pub pattern: &'static [u8],
}

impl ExactMatchRule {
    pub fn matches(&self, method: &[u8]) -> bool {
        self.pattern == method
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialMatchRule {
    pub prefix: &'static [u8],
    pub suffix: &'static [u8],
}

impl PartialMatchRule {
    /// True when `method` starts with `prefix` and ends with `suffix` without
    /// the two overlapping.
    pub fn matches(&self, method: &[u8]) -> bool {
        method.len() >= self.prefix.len() + self.suffix.len()
            && method.starts_with(self.prefix)
            && method.ends_with(self.suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSignature {
    pub version: &'static str,
    pub partial_matches: &'static [PartialMatchRule],
}

pub const EXACT_MATCHES: &[ExactMatchRule] = &[
    ExactMatchRule {
        versions: &["2.16.0", "2.15.0"],
        pattern: &[
            0x2a, 0x01, 0x2b, 0xb7, 0x2a, 0x2c, 0xb5, 0x2a, 0x2d, 0xb5, 0x2a, 0x19, 0xb5, 0x2a,
            0x19, 0xb5, 0xb1,
        ],
    },
    ExactMatchRule {
        versions: &["2.16.0"],
        pattern: &[
            0x2a, 0x01, 0x2b, 0xb7, 0x2a, 0x01, 0xb5, 0x2a, 0x01, 0xb5, 0x2a, 0x01, 0xb5, 0x2a,
            0x01, 0xb5, 0xb1,
        ],
    },
    ExactMatchRule {
        versions: &["2.16.0"],
        pattern: &[0x2a, 0xb4, 0xc6, 0x2a, 0xb4, 0xb8, 0xac, 0x04, 0xac],
    },
    ExactMatchRule {
        versions: &["2.16.0", "2.15.0"],
        pattern: &[0x2a, 0x2b, 0x2c, 0x2d, 0x19, 0x19, 0xb7, 0xb1],
    },
    ExactMatchRule {
        versions: &["2.9.0-2.14.1", "2.17.0", "2.12.2", "2.8.2"],
        pattern: &[0x2a, 0x01, 0x2b, 0xb7, 0x2a, 0x2c, 0xb5, 0xb1],
    },
    ExactMatchRule {
        versions: &["2.9.0-2.14.1", "2.16.0", "2.15.0", "2.17.0", "2.8.2"],
        pattern: &[0x12, 0xb6, 0xb2, 0x01, 0xb8, 0xc0, 0xb0],
    },
    ExactMatchRule {
        versions: &["2.1-2.8.1"],
        pattern: &[0x2a, 0x2b, 0xb7, 0x2a, 0x2c, 0xb5, 0xb1],
    },
    ExactMatchRule {
        versions: &["2.9.0-2.14.1", "2.8.2", "2.1-2.8.1"],
        pattern: &[0x2a, 0xb4, 0x2b, 0xb9, 0xb0],
    },
    ExactMatchRule {
        versions: &["2.9.0-2.14.1", "2.17.0", "2.12.2", "2.8.2", "2.1-2.8.1"],
        pattern: &[0x2a, 0x2b, 0x2c, 0xb7, 0xb1],
    },
    ExactMatchRule {
        versions: &["2.16.0", "2.12.2"],
        pattern: &[0xb8, 0x12, 0x03, 0xb6, 0xac],
    },
    ExactMatchRule {
        versions: &["2.9.0-2.14.1", "2.15.0", "2.17.0", "2.12.2", "2.8.2"],
        pattern: &[0x2a, 0xb4, 0xb8, 0xac],
    },
    ExactMatchRule {
        versions: &["2.16.0"],
        pattern: &[0x2a, 0x2b, 0xb7, 0xb1],
    },
    ExactMatchRule {
        versions: &["2.17.0"],
        pattern: &[0x12, 0xb8, 0xac],
    },
];

const FIELDS_ARETURN_SUFFIX: &[u8] = &[
    0x2a, 0xb4, 0xb6, 0x12, 0xb6, 0x2a, 0xb4, 0xb6, 0x12, 0xb6, 0xb6, 0xb0,
];
const NEW_PUTSTATIC: PartialMatchRule = PartialMatchRule {
    prefix: &[0xbb, 0x59],
    suffix: &[0xb7, 0xb3, 0xb1],
};
const NEW_FIELDS_ARETURN: PartialMatchRule = PartialMatchRule {
    prefix: &[0xbb, 0x59],
    suffix: FIELDS_ARETURN_SUFFIX,
};
const NEW_ARRAY_PUTSTATIC: PartialMatchRule = PartialMatchRule {
    prefix: &[0xbb, 0x59],
    suffix: &[
        0x53, 0x59, 0x04, 0x12, 0x53, 0x59, 0x05, 0x12, 0x53, 0xb8, 0xb3, 0xb1,
    ],
};
const CHECKCAST_ARETURN_SUFFIX: &[u8] = &[
    0xb9, 0x19, 0xc6, 0x19, 0x19, 0xb6, 0x19, 0xb2, 0x19, 0xb8, 0xc0, 0xb0,
];

/// Versions in tie-break priority: single releases newest first, then ranges.
pub const VERSION_SIGNATURES: &[VersionSignature] = &[
    VersionSignature {
        version: "2.17.0",
        partial_matches: &[
            PartialMatchRule {
                prefix: &[0x2a, 0xb4, 0xc7, 0x01, 0xb0, 0xbb, 0x59, 0x2b, 0xb7],
                suffix: &[0xb2, 0x12, 0x2b, 0xb9, 0x01, 0xb0],
            },
            NEW_FIELDS_ARETURN,
            PartialMatchRule {
                prefix: &[0xb8, 0xbb, 0x59],
                suffix: &[0x2a, 0xb6, 0xb6, 0x03, 0xb6, 0xac],
            },
            NEW_PUTSTATIC,
        ],
    },
    VersionSignature {
        version: "2.16.0",
        partial_matches: &[
            PartialMatchRule {
                prefix: &[0x2a, 0xb4, 0xc7, 0x01, 0xb0, 0xbb, 0x59, 0x2b, 0xb7],
                suffix: &[
                    0xb2, 0x12, 0x2b, 0xb9, 0x01, 0xb0, 0x2a, 0xb4, 0x2b, 0xb9, 0xb0,
                ],
            },
            NEW_ARRAY_PUTSTATIC,
            NEW_FIELDS_ARETURN,
        ],
    },
    VersionSignature {
        version: "2.15.0",
        partial_matches: &[
            PartialMatchRule {
                prefix: &[0xbb, 0x59, 0x2b, 0xb7],
                suffix: &[
                    0xb2, 0x12, 0x2b, 0xb9, 0x01, 0xb0, 0x2a, 0xb4, 0x2b, 0xb9, 0xb0,
                ],
            },
            NEW_ARRAY_PUTSTATIC,
            NEW_FIELDS_ARETURN,
        ],
    },
    VersionSignature {
        version: "2.12.2",
        partial_matches: &[NEW_FIELDS_ARETURN, NEW_PUTSTATIC],
    },
    VersionSignature {
        version: "2.9.0-2.14.1",
        partial_matches: &[NEW_FIELDS_ARETURN, NEW_PUTSTATIC],
    },
    VersionSignature {
        version: "2.8.2",
        partial_matches: &[
            PartialMatchRule {
                prefix: &[
                    0xbb, 0x59, 0xb7, 0x12, 0xb6, 0xb6, 0x10, 0xb6, 0x12, 0xb6, 0xb6, 0xb6,
                ],
                suffix: CHECKCAST_ARETURN_SUFFIX,
            },
            NEW_PUTSTATIC,
        ],
    },
    VersionSignature {
        version: "2.1-2.8.1",
        partial_matches: &[
            PartialMatchRule {
                prefix: &[0xbb, 0x59, 0xb7],
                suffix: CHECKCAST_ARETURN_SUFFIX,
            },
            NEW_PUTSTATIC,
            PartialMatchRule {
                prefix: &[0x2a, 0xb4],
                suffix: &[0xb1],
            },
        ],
    },
];
