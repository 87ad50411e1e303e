//! Dump sinks (spec.md §6): a human-readable sink and a CSV sink with an
//! optional constant prefix column.

use std::io::Write;

use crate::error::QueryError;
use crate::operator::Operator;
use crate::record::Record;
use crate::value::Value;

/// Writes `"key1" => value1, "key2" => value2, ...` per record, one line
/// each. [`Record`]'s own `Display` impl already produces this grammar.
pub struct DumpSink<W> {
    writer: W,
}

impl<W: Write> DumpSink<W> {
    pub fn new(writer: W) -> Self {
        DumpSink { writer }
    }
}

impl<W: Write> Operator for DumpSink<W> {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        writeln!(self.writer, "{record}")
            .map_err(|e| QueryError::ParseError(format!("write dump record: {e}")))
    }

    fn reset(&mut self, _record: &Record) -> Result<(), QueryError> {
        Ok(())
    }
}

/// Writes a one-line comma-separated header of field names on first
/// invocation, then one comma-separated line of values per record
/// thereafter. An optional constant column (`prefix`) is prepended to both
/// the header and every row -- used, e.g., to tag every row of a
/// multi-query run with the query name.
pub struct CsvDumpSink<W> {
    writer: W,
    prefix: Option<(String, Value)>,
    header_written: bool,
}

impl<W: Write> CsvDumpSink<W> {
    pub fn new(writer: W) -> Self {
        CsvDumpSink {
            writer,
            prefix: None,
            header_written: false,
        }
    }

    pub fn with_prefix(writer: W, header_name: impl Into<String>, value: Value) -> Self {
        CsvDumpSink {
            writer,
            prefix: Some((header_name.into(), value)),
            header_written: false,
        }
    }
}

impl<W: Write> Operator for CsvDumpSink<W> {
    fn next(&mut self, record: &Record) -> Result<(), QueryError> {
        if !self.header_written {
            let mut header: Vec<&str> = Vec::new();
            if let Some((name, _)) = &self.prefix {
                header.push(name.as_str());
            }
            header.extend(record.iter().map(|(k, _)| k));
            writeln!(self.writer, "{}", header.join(","))
                .map_err(|e| QueryError::ParseError(format!("write CSV dump header: {e}")))?;
            self.header_written = true;
        }

        let mut row: Vec<String> = Vec::new();
        if let Some((_, value)) = &self.prefix {
            row.push(value.to_string());
        }
        row.extend(record.iter().map(|(_, v)| v.to_string()));
        writeln!(self.writer, "{}", row.join(","))
            .map_err(|e| QueryError::ParseError(format!("write CSV dump row: {e}")))
    }

    fn reset(&mut self, _record: &Record) -> Result<(), QueryError> {
        Ok(())
    }
}
