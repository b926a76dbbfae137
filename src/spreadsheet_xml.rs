//! XML Spreadsheet 2003 (SpreadsheetML) report writer.
//!
//! Produces a single-worksheet workbook that spreadsheet applications open
//! directly, with the highlight fills, column widths and frozen header row of
//! the sheet layout.

use crate::error::Result;
use crate::report::Highlight;
use crate::sheet::{Cell, CellValue, Sheet};
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const EXCEL_NS: &str = "urn:schemas-microsoft-com:office:excel";

/// Points per character of column width.
const POINTS_PER_CHAR: f64 = 7.0;

/// Fill colour for each highlight.
pub fn fill_colour(highlight: Highlight) -> &'static str {
    match highlight {
        Highlight::CleanAdded => "#C6EFCE",
        Highlight::Ambiguous | Highlight::Spacer => "#FFEB9C",
        Highlight::Removed => "#FFC7CE",
    }
}

fn highlight_key(highlight: Option<Highlight>) -> &'static str {
    match highlight {
        None => "plain",
        Some(Highlight::CleanAdded) => "clean",
        Some(Highlight::Ambiguous) => "ambiguous",
        Some(Highlight::Removed) => "removed",
        Some(Highlight::Spacer) => "spacer",
    }
}

const HIGHLIGHTS: [Option<Highlight>; 5] = [
    None,
    Some(Highlight::CleanAdded),
    Some(Highlight::Ambiguous),
    Some(Highlight::Removed),
    Some(Highlight::Spacer),
];

fn style_id(highlight: Option<Highlight>, is_date: bool) -> String {
    if is_date {
        format!("{}-date", highlight_key(highlight))
    } else {
        highlight_key(highlight).to_string()
    }
}

/// Report grid written as a SpreadsheetML workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlWorkbook<'a> {
    pub sheet: &'a Sheet,
}

impl XmlWorkbook<'_> {
    /// Write the workbook to any destination implementing `Write`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use credit_recon::{reconcile_records, ReconcileOptions, Sheet};
    /// use credit_recon::spreadsheet_xml::XmlWorkbook;
    ///
    /// let options = ReconcileOptions::new()?;
    /// let report = reconcile_records(&[], &[], &options);
    /// let sheet = Sheet::layout(&report, options.max_text_width);
    /// let mut file = File::create("reconciliation.xml")?;
    /// XmlWorkbook { sheet: &sheet }.write_to(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut xml = Writer::new(writer);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        xml.write_event(Event::PI(BytesPI::new("mso-application progid=\"Excel.Sheet\"")))?;

        let mut workbook = BytesStart::new("Workbook");
        workbook.push_attribute(("xmlns", SPREADSHEET_NS));
        workbook.push_attribute(("xmlns:ss", SPREADSHEET_NS));
        workbook.push_attribute(("xmlns:x", EXCEL_NS));
        xml.write_event(Event::Start(workbook))?;

        write_styles(&mut xml)?;
        self.write_worksheet(&mut xml)?;

        xml.write_event(Event::End(BytesEnd::new("Workbook")))?;
        Ok(())
    }

    fn write_worksheet<W: Write>(&self, xml: &mut Writer<W>) -> Result<()> {
        let mut worksheet = BytesStart::new("Worksheet");
        worksheet.push_attribute(("ss:Name", self.sheet.title.as_str()));
        xml.write_event(Event::Start(worksheet))?;
        xml.write_event(Event::Start(BytesStart::new("Table")))?;

        for column in 1..=self.sheet.max_column() {
            let width = format!("{:.1}", self.sheet.column_width(column) as f64 * POINTS_PER_CHAR);
            let index = column.to_string();
            let mut element = BytesStart::new("Column");
            element.push_attribute(("ss:Index", index.as_str()));
            element.push_attribute(("ss:Width", width.as_str()));
            xml.write_event(Event::Empty(element))?;
        }

        for (r, row) in self.sheet.rows().enumerate() {
            let index = (r + 1).to_string();
            let mut element = BytesStart::new("Row");
            element.push_attribute(("ss:Index", index.as_str()));
            xml.write_event(Event::Start(element))?;
            for (c, cell) in row.iter().enumerate() {
                write_cell(xml, c + 1, cell)?;
            }
            xml.write_event(Event::End(BytesEnd::new("Row")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("Table")))?;
        self.write_options(xml)?;
        xml.write_event(Event::End(BytesEnd::new("Worksheet")))?;
        Ok(())
    }

    /// Frozen header pane.
    fn write_options<W: Write>(&self, xml: &mut Writer<W>) -> Result<()> {
        let mut options = BytesStart::new("WorksheetOptions");
        options.push_attribute(("xmlns", EXCEL_NS));
        xml.write_event(Event::Start(options))?;

        if self.sheet.frozen_rows > 0 {
            let frozen = self.sheet.frozen_rows.to_string();
            xml.write_event(Event::Empty(BytesStart::new("FreezePanes")))?;
            xml.write_event(Event::Empty(BytesStart::new("FrozenNoSplit")))?;
            write_text_element(xml, "SplitHorizontal", &frozen)?;
            write_text_element(xml, "TopRowBottomPane", &frozen)?;
            write_text_element(xml, "ActivePane", "2")?;
        }

        xml.write_event(Event::End(BytesEnd::new("WorksheetOptions")))?;
        Ok(())
    }
}

fn write_styles<W: Write>(xml: &mut Writer<W>) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("Styles")))?;

    for highlight in HIGHLIGHTS {
        for is_date in [false, true] {
            let id = style_id(highlight, is_date);
            let mut style = BytesStart::new("Style");
            style.push_attribute(("ss:ID", id.as_str()));
            xml.write_event(Event::Start(style))?;

            if let Some(highlight) = highlight {
                let mut interior = BytesStart::new("Interior");
                interior.push_attribute(("ss:Color", fill_colour(highlight)));
                interior.push_attribute(("ss:Pattern", "Solid"));
                xml.write_event(Event::Empty(interior))?;
            }
            if is_date {
                let mut format = BytesStart::new("NumberFormat");
                format.push_attribute(("ss:Format", "yyyy\\-mm\\-dd"));
                xml.write_event(Event::Empty(format))?;
            }

            xml.write_event(Event::End(BytesEnd::new("Style")))?;
        }
    }

    xml.write_event(Event::End(BytesEnd::new("Styles")))?;
    Ok(())
}

fn write_cell<W: Write>(xml: &mut Writer<W>, column: usize, cell: &Cell) -> Result<()> {
    if cell.value == CellValue::Empty && cell.highlight.is_none() {
        return Ok(());
    }

    let is_date = matches!(cell.value, CellValue::Date(_));
    let index = column.to_string();
    let style = style_id(cell.highlight, is_date);
    let mut element = BytesStart::new("Cell");
    element.push_attribute(("ss:Index", index.as_str()));
    element.push_attribute(("ss:StyleID", style.as_str()));

    let (data_type, text) = match &cell.value {
        CellValue::Empty => {
            xml.write_event(Event::Empty(element))?;
            return Ok(());
        }
        CellValue::Text(s) => ("String", s.clone()),
        CellValue::Number(n) => ("Number", n.to_string()),
        CellValue::Date(d) => ("DateTime", format!("{}T00:00:00.000", d.format("%Y-%m-%d"))),
    };

    xml.write_event(Event::Start(element))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", data_type));
    xml.write_event(Event::Start(data))?;
    xml.write_event(Event::Text(BytesText::new(&text)))?;
    xml.write_event(Event::End(BytesEnd::new("Data")))?;
    xml.write_event(Event::End(BytesEnd::new("Cell")))?;
    Ok(())
}

fn write_text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
