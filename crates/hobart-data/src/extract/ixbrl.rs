//! Inline XBRL reading.
//!
//! Accounts filed in inline XBRL carry their facts as `ix:nonFraction`
//! elements inside ordinary XHTML. Each fact names its concept, points at a
//! context (`contextRef`) holding the entity identifier and period, and at a
//! unit (`unitRef`) holding the measure. This reader streams the document
//! once with `quick-xml` and collects contexts, units and facts; it does not
//! validate against any taxonomy.

use crate::filing::{FactValue, Period};
use crate::extract::value::parse_amount;
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use std::collections::HashMap;

/// Resolved reporting context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Context {
    /// Entity identifier (the company number)
    pub(crate) entity: Option<String>,
    /// Reporting period
    pub(crate) period: Option<Period>,
}

/// A numeric fact as tagged, before unit/context resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineFact {
    pub(crate) name: String,
    pub(crate) context_ref: String,
    pub(crate) unit_ref: Option<String>,
    pub(crate) text: String,
    pub(crate) negative: bool,
    pub(crate) scale: i32,
    pub(crate) format: Option<String>,
    pub(crate) nil: bool,
}

impl InlineFact {
    /// Local part of the concept name ("core:Equity" -> "Equity").
    pub(crate) fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Interprets the tagged text using the `format`, `scale`, `sign` and
    /// `nil` attributes.
    ///
    /// Text that does not parse is kept as [`FactValue::Text`].
    pub(crate) fn value(&self) -> FactValue {
        if self.nil {
            return FactValue::Text(String::new());
        }

        let format = self.format.as_deref().map(local_part).unwrap_or_default();
        let format = format.to_ascii_lowercase();
        let text = self.text.trim();

        let zero = ["zerodash", "fixed-zero", "fixedzero"];
        let parsed = if zero.iter().any(|f| format.contains(f)) {
            Some(0.0)
        } else if format.contains("numcommadecimal") || format.contains("num-comma-decimal") {
            let swapped: String = text
                .chars()
                .filter(|c| *c != '.' && !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            parse_amount(&swapped)
        } else {
            parse_amount(text)
        };

        match parsed {
            Some(amount) => {
                let scaled = amount * 10f64.powi(self.scale);
                FactValue::Number(if self.negative { -scaled } else { scaled })
            }
            None => FactValue::Text(text.to_string()),
        }
    }
}

/// Everything read from one inline XBRL document.
#[derive(Debug, Clone, Default)]
pub(crate) struct InlineDocument {
    pub(crate) contexts: HashMap<String, Context>,
    pub(crate) units: HashMap<String, String>,
    pub(crate) facts: Vec<InlineFact>,
    pub(crate) entity: Option<String>,
}

impl InlineDocument {
    /// Streams `xml` and collects contexts, units and numeric facts.
    ///
    /// End tag names are not checked, so loosely closed XHTML still reads.
    pub(crate) fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;

        let mut parser = InlineParser::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => parser.start(&e, false),
                Ok(Event::Empty(e)) => parser.start(&e, true),
                Ok(Event::Text(t)) => parser.text(&text_of(&t)),
                Ok(Event::End(e)) => parser.end(e.local_name().as_ref()),
                Ok(_) => {}
                Err(e) => {
                    return Err(format!("{} at byte {}", e, reader.buffer_position()));
                }
            }
            buf.clear();
        }

        Ok(parser.doc)
    }

    /// Unit measure for a `unitRef`, falling back to the reference itself.
    pub(crate) fn unit(&self, unit_ref: &str) -> String {
        self.units
            .get(unit_ref)
            .cloned()
            .unwrap_or_else(|| unit_ref.to_string())
    }

    /// Latest period end declared by any context.
    pub(crate) fn latest_period_end(&self) -> Option<NaiveDate> {
        self.contexts
            .values()
            .filter_map(|c| c.period.map(|p| p.end()))
            .max()
    }
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    Identifier,
    StartDate,
    EndDate,
    Instant,
    Measure,
}

#[derive(Debug, Default)]
struct ContextBuilder {
    id: String,
    entity: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    instant: Option<NaiveDate>,
}

impl ContextBuilder {
    fn build(self) -> (String, Context) {
        let period = match (self.instant, self.start, self.end) {
            (Some(date), _, _) => Some(Period::Instant(date)),
            (None, Some(start), Some(end)) => Some(Period::Duration { start, end }),
            (None, None, Some(end)) => Some(Period::Instant(end)),
            _ => None,
        };
        (
            self.id,
            Context {
                entity: self.entity,
                period,
            },
        )
    }
}

#[derive(Debug)]
struct UnitBuilder {
    id: String,
    measure: Option<String>,
}

#[derive(Debug)]
struct PendingFact {
    fact: InlineFact,
    depth: usize,
}

#[derive(Debug, Default)]
struct InlineParser {
    doc: InlineDocument,
    context: Option<ContextBuilder>,
    unit: Option<UnitBuilder>,
    fact: Option<PendingFact>,
    capture: Option<Capture>,
}

impl InlineParser {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        // Markup nested inside a fact only contributes text.
        if let Some(pending) = self.fact.as_mut() {
            if !empty {
                pending.depth += 1;
            }
            return;
        }

        match e.local_name().as_ref() {
            b"context" if !empty => {
                self.context = Some(ContextBuilder {
                    id: attr(e, b"id").unwrap_or_default(),
                    ..ContextBuilder::default()
                });
            }
            b"identifier" if !empty && self.context.is_some() => {
                self.capture = Some(Capture::Identifier);
            }
            b"startDate" if !empty && self.context.is_some() => {
                self.capture = Some(Capture::StartDate);
            }
            b"endDate" if !empty && self.context.is_some() => {
                self.capture = Some(Capture::EndDate);
            }
            b"instant" if !empty && self.context.is_some() => {
                self.capture = Some(Capture::Instant);
            }
            b"unit" if !empty => {
                self.unit = Some(UnitBuilder {
                    id: attr(e, b"id").unwrap_or_default(),
                    measure: None,
                });
            }
            b"measure" if !empty && self.unit.is_some() => {
                self.capture = Some(Capture::Measure);
            }
            b"nonFraction" => {
                let Some(name) = attr(e, b"name") else {
                    return;
                };
                let fact = InlineFact {
                    name,
                    context_ref: attr(e, b"contextRef").unwrap_or_default(),
                    unit_ref: attr(e, b"unitRef"),
                    text: String::new(),
                    negative: attr(e, b"sign").as_deref() == Some("-"),
                    scale: attr(e, b"scale").and_then(|s| s.parse().ok()).unwrap_or(0),
                    format: attr(e, b"format"),
                    nil: attr(e, b"nil").is_some_and(|v| v.eq_ignore_ascii_case("true")),
                };
                if empty {
                    self.doc.facts.push(fact);
                } else {
                    self.fact = Some(PendingFact { fact, depth: 0 });
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(pending) = self.fact.as_mut() {
            pending.fact.text.push_str(text);
            return;
        }

        let Some(capture) = self.capture else {
            return;
        };
        let value = text.trim();
        match capture {
            Capture::Identifier => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.entity = Some(value.to_string());
                }
                if self.doc.entity.is_none() && !value.is_empty() {
                    self.doc.entity = Some(value.to_string());
                }
            }
            Capture::StartDate => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.start = parse_date(value);
                }
            }
            Capture::EndDate => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.end = parse_date(value);
                }
            }
            Capture::Instant => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.instant = parse_date(value);
                }
            }
            Capture::Measure => {
                if let Some(unit) = self.unit.as_mut()
                    && unit.measure.is_none()
                {
                    unit.measure = Some(local_part(value).to_string());
                }
            }
        }
    }

    fn end(&mut self, local: &[u8]) {
        if let Some(pending) = self.fact.as_mut() {
            if pending.depth > 0 {
                pending.depth -= 1;
            } else if let Some(done) = self.fact.take() {
                self.doc.facts.push(done.fact);
            }
            return;
        }

        self.capture = None;
        match local {
            b"context" => {
                if let Some(builder) = self.context.take()
                    && !builder.id.is_empty()
                {
                    let (id, context) = builder.build();
                    self.doc.contexts.insert(id, context);
                }
            }
            b"unit" => {
                if let Some(UnitBuilder {
                    id,
                    measure: Some(measure),
                }) = self.unit.take()
                {
                    self.doc.units.insert(id, measure);
                }
            }
            _ => {}
        }
    }
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
}

fn text_of(t: &BytesText<'_>) -> String {
    t.unescape()
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}
