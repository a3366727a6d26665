use crate::domain::token::TokenId;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// A token issued for one input card. `card` is the masked card number.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TokenRow {
    pub card: String,
    pub token_id: TokenId,
    pub token: String,
}

/// The result of one sale request. `status` is `approved` or an error kind.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct SaleOutcomeRow {
    pub token: String,
    pub status: String,
    pub message: String,
}

/// Writes result rows as CSV, header first.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write<T: Serialize>(&mut self, row: &T) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_once() {
        let mut out = Vec::new();
        {
            let mut writer = OutcomeWriter::new(&mut out);
            for token in ["1111", "2222"] {
                writer
                    .write(&SaleOutcomeRow {
                        token: token.to_string(),
                        status: "approved".to_string(),
                        message: "Approved".to_string(),
                    })
                    .unwrap();
            }
            writer.flush().unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "token,status,message\n1111,approved,Approved\n2222,approved,Approved\n"
        );
    }

    #[test]
    fn test_token_row_layout() {
        let mut out = Vec::new();
        {
            let mut writer = OutcomeWriter::new(&mut out);
            writer
                .write(&TokenRow {
                    card: "************1111".to_string(),
                    token_id: TokenId::new(),
                    token: "9999888877776666".to_string(),
                })
                .unwrap();
            writer.flush().unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("card,token_id,token"));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row[0], "************1111");
        assert_eq!(row[1].len(), 36);
        assert_eq!(row[2], "9999888877776666");
    }
}
