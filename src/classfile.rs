//! Minimal class-file reader producing per-method opcode streams.
//!
//! Only enough of the class-file format is understood to find each method's
//! `Code` attribute. The instruction array is then reduced to its opcodes:
//! operands (constant-pool indices, local slots, branch offsets, switch
//! tables) vary with the compiler and are dropped.

use thiserror::Error;

/// Opcode stream of one method body, one byte per instruction.
pub type MethodBytecode = Vec<u8>;

const MAGIC: u32 = 0xCAFE_BABE;
const CODE_ATTRIBUTE: &[u8] = b"Code";

const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of class file at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    #[error("invalid constant pool tag {tag} at index {index}")]
    InvalidConstantTag { tag: u8, index: u16 },

    #[error("two-slot constant at index {index} runs past the end of the constant pool")]
    TruncatedConstantPool { index: u16 },

    #[error("constant pool index {0} does not name a UTF-8 entry")]
    BadConstantIndex(u16),

    #[error("invalid opcode {opcode:#04x} at code offset {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },

    #[error("invalid wide operand {opcode:#04x} at code offset {offset}")]
    InvalidWide { opcode: u8, offset: usize },

    #[error("malformed switch table at code offset {offset}")]
    InvalidSwitch { offset: usize },

    #[error("instruction {opcode:#04x} at code offset {offset} runs past the end of the code array")]
    TruncatedInstruction { opcode: u8, offset: usize },
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// UTF-8 constants by pool index; every other slot is `None`.
struct ConstantPool<'a> {
    utf8: Vec<Option<&'a [u8]>>,
}

impl<'a> ConstantPool<'a> {
    fn read(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let count = r.u16()? as usize;
        let mut utf8 = vec![None; count];

        let mut index = 1usize;
        while index < count {
            let tag = r.u8()?;
            match tag {
                1 => {
                    let len = r.u16()? as usize;
                    utf8[index] = Some(r.take(len)?);
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    r.take(4)?;
                }
                5 | 6 => {
                    // Long and double constants occupy two slots.
                    if index + 1 >= count {
                        return Err(DecodeError::TruncatedConstantPool { index: index as u16 });
                    }
                    r.take(8)?;
                    index += 1;
                }
                7 | 8 | 16 | 19 | 20 => {
                    r.take(2)?;
                }
                15 => {
                    r.take(3)?;
                }
                _ => {
                    return Err(DecodeError::InvalidConstantTag {
                        tag,
                        index: index as u16,
                    });
                }
            }
            index += 1;
        }

        Ok(Self { utf8 })
    }

    fn utf8(&self, index: u16) -> Result<&'a [u8], DecodeError> {
        self.utf8
            .get(index as usize)
            .copied()
            .flatten()
            .ok_or(DecodeError::BadConstantIndex(index))
    }
}

fn skip_attributes(r: &mut Reader<'_>) -> Result<(), DecodeError> {
    let count = r.u16()?;
    for _ in 0..count {
        r.u16()?;
        let len = r.u32()? as usize;
        r.take(len)?;
    }
    Ok(())
}

/// Decode `class_bytes` and return the opcode stream of every method that
/// carries a `Code` attribute, in declaration order.
pub fn method_bytecode(class_bytes: &[u8]) -> Result<Vec<MethodBytecode>, DecodeError> {
    let mut r = Reader::new(class_bytes);

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }
    // minor_version, major_version
    r.take(4)?;

    let pool = ConstantPool::read(&mut r)?;

    // access_flags, this_class, super_class
    r.take(6)?;
    let interfaces = r.u16()? as usize;
    r.take(interfaces * 2)?;

    let fields = r.u16()?;
    for _ in 0..fields {
        r.take(6)?;
        skip_attributes(&mut r)?;
    }

    let methods = r.u16()?;
    let mut bytecode = Vec::with_capacity(methods as usize);
    for _ in 0..methods {
        r.take(6)?;
        let attributes = r.u16()?;
        let mut code = None;
        for _ in 0..attributes {
            let name = pool.utf8(r.u16()?)?;
            let len = r.u32()? as usize;
            let body = r.take(len)?;
            if code.is_none() && name == CODE_ATTRIBUTE {
                code = Some(code_array(body)?);
            }
        }
        if let Some(code) = code {
            bytecode.push(opcodes(code)?);
        }
    }

    Ok(bytecode)
}

fn code_array(attribute: &[u8]) -> Result<&[u8], DecodeError> {
    let mut r = Reader::new(attribute);
    // max_stack, max_locals
    r.take(4)?;
    let len = r.u32()? as usize;
    r.take(len)
}

fn fixed_operand_len(opcode: u8) -> Option<usize> {
    Some(match opcode {
        0x00..=0x0f => 0,
        0x10 => 1,
        0x11 => 2,
        0x12 => 1,
        0x13 | 0x14 => 2,
        0x15..=0x19 => 1,
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1,
        0x3b..=0x83 => 0,
        IINC => 2,
        0x85..=0x98 => 0,
        0x99..=0xa8 => 2,
        0xa9 => 1,
        0xac..=0xb1 => 0,
        0xb2..=0xb8 => 2,
        0xb9 | 0xba => 4,
        0xbb => 2,
        0xbc => 1,
        0xbd => 2,
        0xbe | 0xbf => 0,
        0xc0 | 0xc1 => 2,
        0xc2 | 0xc3 => 0,
        0xc5 => 3,
        0xc6 | 0xc7 => 2,
        0xc8 | 0xc9 => 4,
        0xca | 0xfe | 0xff => 0,
        _ => return None,
    })
}

fn read_i32(code: &[u8], at: usize) -> Option<i64> {
    let b = code.get(at..at.checked_add(4)?)?;
    Some(i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64)
}

/// Length in bytes of the instruction starting at `pc`, opcode included.
fn instruction_len(code: &[u8], pc: usize) -> Result<usize, DecodeError> {
    let opcode = code[pc];
    let truncated = DecodeError::TruncatedInstruction { opcode, offset: pc };

    match opcode {
        TABLESWITCH | LOOKUPSWITCH => {
            // Operands start at the next four-byte boundary of the code array.
            let table = (pc + 4) & !3;
            let invalid = DecodeError::InvalidSwitch { offset: pc };
            let entries_len = if opcode == TABLESWITCH {
                let low = read_i32(code, table + 4).ok_or(truncated.clone())?;
                let high = read_i32(code, table + 8).ok_or(truncated.clone())?;
                if high < low {
                    return Err(invalid);
                }
                12 + (high - low + 1) * 4
            } else {
                let pairs = read_i32(code, table + 4).ok_or(truncated.clone())?;
                if pairs < 0 {
                    return Err(invalid);
                }
                8 + pairs * 8
            };
            Ok(table - pc + entries_len as usize)
        }
        WIDE => {
            let widened = *code.get(pc + 1).ok_or(truncated)?;
            match widened {
                IINC => Ok(6),
                0x15..=0x19 | 0x36..=0x3a | 0xa9 => Ok(4),
                _ => Err(DecodeError::InvalidWide {
                    opcode: widened,
                    offset: pc,
                }),
            }
        }
        _ => fixed_operand_len(opcode)
            .map(|operands| operands + 1)
            .ok_or(DecodeError::InvalidOpcode { opcode, offset: pc }),
    }
}

/// Reduce a `Code` array to the opcode of each instruction.
pub fn opcodes(code: &[u8]) -> Result<MethodBytecode, DecodeError> {
    let mut out = Vec::with_capacity(code.len());
    let mut pc = 0usize;
    while pc < code.len() {
        let opcode = code[pc];
        let len = instruction_len(code, pc)?;
        let next = pc
            .checked_add(len)
            .filter(|next| *next <= code.len())
            .ok_or(DecodeError::TruncatedInstruction { opcode, offset: pc })?;
        out.push(opcode);
        pc = next;
    }
    Ok(out)
}
