//! Lays the invoice out on A4 pages and writes it as a PDF.
//!
//! The first page carries the header, the customer and invoice panel, the
//! cost summary and the payment terms. The itemized hours follow on as many
//! pages as they need. Every page ends with the invoice number and its page
//! number.

mod canvas;
mod logo;
mod refs;

pub use logo::Logo;

use chrono::{Datelike, Local, Offset, Timelike};
use log::{debug, warn};
use pdf_writer::{Date, Finish, Name, Pdf, Rect, TextStr};
use strum::IntoEnumIterator;

use crate::billing::InvoiceTotal;
use crate::details::Details;
use crate::display::{Hours, Money};
use crate::items::Item;
use canvas::{pt, wrap, Canvas, Font, PAGE_HEIGHT, PAGE_WIDTH};
use refs::{ObjectReferences, RefType};

const MARGIN: f32 = 10.0;
const RIGHT: f32 = PAGE_WIDTH - MARGIN;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Rows may not run into the footer
const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - 25.0;
const SECTION_SPACING: f32 = 10.0;

const LINE_HEIGHT: f32 = 5.0;
const CELL_PADDING: f32 = 2.0;
const BODY_SIZE: f32 = 10.0;
const ISSUER_SIZE: f32 = 14.0;
const NUMBER_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 8.0;
const BORDER: f32 = 0.2;

const LOGO_X: f32 = 10.0;
const LOGO_Y: f32 = 11.0;
const LOGO_WIDTH: f32 = 15.0;

const PANEL_TOP: f32 = 40.0;
const PANEL_HEIGHT: f32 = 25.0;
const ITEMS_TITLE: f32 = 48.0;

const LOGO: Name = Name(b"Im0");

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    width: f32,
    align: Align,
}

const fn left(width: f32) -> Column {
    Column {
        width,
        align: Align::Left,
    }
}

const fn right(width: f32) -> Column {
    Column {
        width,
        align: Align::Right,
    }
}

const SUMMARY_COLUMNS: [Column; 4] = [left(90.0), right(25.0), right(35.0), right(40.0)];
const TOTAL_COLUMNS: [Column; 2] = [right(150.0), right(40.0)];
const ITEM_COLUMNS: [Column; 3] = [left(35.0), right(25.0), left(130.0)];

/// Bordered cells laid out left to right from the page margin
struct Table<'a> {
    columns: &'a [Column],
}

/// Cell contents already wrapped to their column
type Cells = Vec<Vec<String>>;

impl<'a> Table<'a> {
    fn new(columns: &'a [Column]) -> Self {
        Self { columns }
    }

    /// Each cell may hold several paragraphs, each wrapped on its own
    fn cells(&self, texts: &[Vec<String>]) -> Cells {
        self.columns
            .iter()
            .zip(texts)
            .map(|(column, paragraphs)| {
                paragraphs
                    .iter()
                    .flat_map(|p| wrap(p, column.width - 2.0 * CELL_PADDING, BODY_SIZE))
                    .collect()
            })
            .collect()
    }

    fn row(&self, texts: &[&str]) -> Cells {
        let texts: Vec<Vec<String>> = texts.iter().map(|t| vec![t.to_string()]).collect();
        self.cells(&texts)
    }

    fn height(cells: &Cells) -> f32 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        lines as f32 * LINE_HEIGHT + 3.0
    }

    /// Drop the lines that would take a row drawn at `y` below `bottom`.
    /// At least one line is kept.
    fn clamp(mut cells: Cells, y: f32, bottom: f32) -> Cells {
        let room = ((bottom - y - 3.0) / LINE_HEIGHT).floor().max(1.0) as usize;
        if cells.iter().any(|lines| lines.len() > room) {
            warn!("Row too tall for the page, keeping its first {} lines", room);
            for lines in &mut cells {
                lines.truncate(room);
            }
        }
        cells
    }

    /// Draw a row with its top edge at `y`, returning the y of its bottom edge
    fn draw(&self, canvas: &mut Canvas, y: f32, font: Font, cells: &Cells) -> f32 {
        let height = Self::height(cells);
        let mut x = MARGIN;

        for (column, lines) in self.columns.iter().zip(cells) {
            canvas.rect(x, y, column.width, height);
            for (i, line) in lines.iter().enumerate() {
                let baseline = y + 5.5 + i as f32 * LINE_HEIGHT;
                match column.align {
                    Align::Left => canvas.text(x + CELL_PADDING, baseline, font, BODY_SIZE, line),
                    Align::Right => canvas.text_right(
                        x + column.width - CELL_PADDING,
                        baseline,
                        font,
                        BODY_SIZE,
                        line,
                    ),
                }
            }
            x += column.width;
        }

        y + height
    }
}

pub struct InvoiceDocument<'a> {
    details: &'a Details,
    items: &'a [Item],
    total: &'a InvoiceTotal,
    logo: Option<&'a Logo>,
}

impl<'a> InvoiceDocument<'a> {
    pub fn new(
        details: &'a Details,
        items: &'a [Item],
        total: &'a InvoiceTotal,
        logo: Option<&'a Logo>,
    ) -> Self {
        Self {
            details,
            items,
            total,
            logo,
        }
    }

    /// Lay out every page and produce the bytes of the PDF file
    pub fn render(&self) -> Vec<u8> {
        let mut pages = self.layout();
        let count = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            self.footer(page, i + 1, count);
        }
        debug!("Laid out {} pages", count);

        self.write(pages)
    }

    fn layout(&self) -> Vec<Canvas> {
        let mut pages = vec![self.summary_page()];
        pages.extend(self.item_pages());
        pages
    }

    /// Issuer text moves right to make room for a logo
    fn header_x(&self) -> f32 {
        MARGIN + if self.logo.is_some() { 20.0 } else { 2.0 }
    }

    fn header(&self, page: &mut Canvas) {
        page.line_width(BORDER);

        if let Some(logo) = self.logo {
            page.image(LOGO, LOGO_X, LOGO_Y, LOGO_WIDTH, logo.scaled_height(LOGO_WIDTH));
        }

        let x = self.header_x();
        page.text(x, 17.0, Font::Heading, ISSUER_SIZE, &self.details.company.name);
        for (i, line) in self.details.contact().iter().enumerate() {
            page.text(x, 22.0 + i as f32 * LINE_HEIGHT, Font::Regular, BODY_SIZE, line);
        }
    }

    fn footer(&self, page: &mut Canvas, number: usize, count: usize) {
        let y = PAGE_HEIGHT - 10.0;
        page.fill_grey(0.5);
        page.text(MARGIN, y, Font::Italic, FOOTER_SIZE, &self.details.invoice_label());
        page.text_right(
            RIGHT,
            y,
            Font::Italic,
            FOOTER_SIZE,
            &format!("Page {} of {}", number, count),
        );
        page.fill_grey(0.0);
    }

    fn summary_page(&self) -> Canvas {
        let mut page = Canvas::new();
        self.header(&mut page);

        page.rect(MARGIN, PANEL_TOP, CONTENT_WIDTH, PANEL_HEIGHT);
        for (i, line) in self.details.customer_lines().iter().enumerate() {
            let y = PANEL_TOP + 7.0 + i as f32 * 6.0;
            page.text(MARGIN + 2.0, y, Font::Regular, BODY_SIZE, line);
        }
        page.text_right(
            RIGHT - 2.0,
            PANEL_TOP + 8.0,
            Font::Bold,
            NUMBER_SIZE,
            &self.details.invoice_label(),
        );
        page.text_right(
            RIGHT - 2.0,
            PANEL_TOP + 15.0,
            Font::Regular,
            BODY_SIZE,
            &self.details.invoice_date(),
        );

        let y = self.summary_table(&mut page, PANEL_TOP + PANEL_HEIGHT + SECTION_SPACING);

        let y = y + SECTION_SPACING + LINE_HEIGHT;
        page.text(MARGIN, y, Font::Regular, BODY_SIZE, &self.details.payable_to());
        page.text(MARGIN, y + LINE_HEIGHT, Font::Regular, BODY_SIZE, &self.details.terms());

        page
    }

    fn summary_table(&self, page: &mut Canvas, y: f32) -> f32 {
        let invoice = &self.details.invoice;
        let table = Table::new(&SUMMARY_COLUMNS);

        let header = table.row(&["Description", "Hours", "Unit Cost", "Amount"]);
        let y = table.draw(page, y, Font::Bold, &header);

        let body = table.cells(&[
            vec![invoice.description.clone(), self.details.period()],
            vec![Hours(self.total.total_hours).to_string()],
            vec![Money(invoice.unit_cost).to_string()],
            vec![Money(self.total.total_cost).to_string()],
        ]);
        let total_rows = if self.total.tax.is_some() { 3.0 } else { 2.0 };
        let reserved = total_rows * (LINE_HEIGHT + 3.0) + SECTION_SPACING + 2.0 * LINE_HEIGHT;
        let body = Table::clamp(body, y, CONTENT_BOTTOM - reserved);
        let mut y = table.draw(page, y, Font::Regular, &body);

        let totals = Table::new(&TOTAL_COLUMNS);
        let subtotal = Money(self.total.total_cost).to_string();
        let row = totals.row(&["Subtotal", subtotal.as_str()]);
        y = totals.draw(page, y, Font::Regular, &row);
        if let Some(tax) = &self.total.tax {
            let amount = Money(tax.amount).to_string();
            let row = totals.row(&[tax.to_string().as_str(), amount.as_str()]);
            y = totals.draw(page, y, Font::Regular, &row);
        }
        let due = Money(self.total.amount_due).to_string();
        totals.draw(page, y, Font::Bold, &totals.row(&["Total Due", due.as_str()]))
    }

    fn item_pages(&self) -> Vec<Canvas> {
        let table = Table::new(&ITEM_COLUMNS);
        let mut pages = Vec::new();
        let mut page = Canvas::new();
        let mut y = self.start_item_page(&mut page, &table, false);
        let mut rows_on_page = 0;

        let total_hours = Hours(self.total.total_hours).to_string();
        let rows = self
            .items
            .iter()
            .map(|item| (Font::Regular, table.cells(&item.cells().map(|c| vec![c]))))
            .chain(std::iter::once((
                Font::Bold,
                table.row(&["Total", total_hours.as_str(), ""]),
            )));

        for (font, cells) in rows {
            if rows_on_page > 0 && y + Table::height(&cells) > CONTENT_BOTTOM {
                pages.push(std::mem::replace(&mut page, Canvas::new()));
                y = self.start_item_page(&mut page, &table, true);
                rows_on_page = 0;
            }
            let cells = Table::clamp(cells, y, CONTENT_BOTTOM);
            y = table.draw(&mut page, y, font, &cells);
            rows_on_page += 1;
        }

        pages.push(page);
        pages
    }

    /// Header, title and column headings, returning where rows start
    fn start_item_page(&self, page: &mut Canvas, table: &Table, continued: bool) -> f32 {
        self.header(page);
        let title = if continued {
            "Itemized Hours (continued)"
        } else {
            "Itemized Hours"
        };
        page.text(MARGIN, ITEMS_TITLE, Font::Bold, NUMBER_SIZE, title);

        let header = table.row(&["Date", "Hours", "Description"]);
        table.draw(page, ITEMS_TITLE + 4.0, Font::Bold, &header)
    }

    fn write(&self, pages: Vec<Canvas>) -> Vec<u8> {
        let mut refs = ObjectReferences::new();
        let mut writer = Pdf::new();

        let catalog_id = refs.get(RefType::Catalog);
        let page_tree_id = refs.get(RefType::PageTree);
        let page_refs: Vec<_> = (0..pages.len())
            .map(|i| refs.get(RefType::Page(i)))
            .collect();

        writer.catalog(catalog_id).pages(page_tree_id);
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs.iter().copied());

        for font in Font::iter() {
            writer
                .type1_font(refs.get(RefType::Font(font)))
                .base_font(font.base_font())
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        if let Some(logo) = self.logo {
            logo.write(&mut refs, &mut writer);
        }

        for (i, canvas) in pages.into_iter().enumerate() {
            let content_id = refs.get(RefType::ContentForPage(i));
            let mut page = writer.page(page_refs[i]);
            page.media_box(Rect::new(0.0, 0.0, pt(PAGE_WIDTH), pt(PAGE_HEIGHT)));
            page.parent(page_tree_id);
            page.contents(content_id);

            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            for font in Font::iter() {
                fonts.pair(font.resource(), refs.get(RefType::Font(font)));
            }
            fonts.finish();
            if self.logo.is_some() {
                resources.x_objects().pair(LOGO, refs.get(RefType::Logo));
            }
            resources.finish();
            page.finish();

            writer.stream(content_id, &canvas.finish());
        }

        self.write_info(&mut refs, &mut writer);
        writer.finish()
    }

    fn write_info(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let mut info = writer.document_info(refs.get(RefType::Info));
        info.title(TextStr(&self.details.invoice_label()));
        info.author(TextStr(&self.details.company.name));
        info.subject(TextStr(&self.details.invoice.description));
        info.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));

        let now = Local::now();
        let offset = now.offset().fix().local_minus_utc();
        let offset_hours = offset / (60 * 60);
        let offset_minutes = ((offset - offset_hours * 60 * 60) / 60).abs();
        let date = Date::new(now.year() as u16)
            .month(now.month() as u8)
            .day(now.day() as u8)
            .hour(now.hour() as u8)
            .minute(now.minute() as u8)
            .second(now.second() as u8)
            .utc_offset_hour(offset_hours as i8)
            .utc_offset_minute(offset_minutes as u8);
        info.creation_date(date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::tests::details;
    use crate::items::tests::item;
    use rust_decimal_macros::dec;

    fn pdf_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).to_string()
    }

    fn render(details: &Details, items: &[Item], logo: Option<&Logo>) -> String {
        let total = InvoiceTotal::calculate(&details.invoice, items).unwrap();
        pdf_text(&InvoiceDocument::new(details, items, &total, logo).render())
    }

    fn items(count: usize) -> Vec<Item> {
        (0..count).map(|_| item("2024-02-13", dec!(1.5))).collect()
    }

    #[test]
    fn summary_and_items_pages() {
        let details = details();
        let pdf = render(&details, &items(5), None);

        assert!(pdf.starts_with("%PDF-"));
        assert!(pdf.contains("/Count 2"));
        assert!(pdf.contains("(Invoice # 42) Tj"));
        assert!(pdf.contains("(March 04, 2024) Tj"));
        assert!(pdf.contains("(Page 1 of 2) Tj"));
        assert!(pdf.contains("(Page 2 of 2) Tj"));
        assert!(pdf.contains("(Terms: 15 days net) Tj"));
        assert!(pdf.contains("(HST (13%)) Tj"));
        assert!(pdf.contains("($97.50) Tj"));
        assert!(pdf.contains("(Feb 13, 2024) Tj"));
        assert!(pdf.contains("(7.5) Tj"));
        assert!(pdf.contains("/BaseFont /Courier-Oblique"));
        assert!(!pdf.contains("/XObject"));
    }

    #[test]
    fn no_tax_line_without_rate() {
        let mut details = details();
        details.invoice.tax_rate = None;
        let pdf = render(&details, &items(2), None);

        assert!(!pdf.contains("(HST"));
        assert!(pdf.contains("(Total Due) Tj"));
        assert!(pdf.contains("($300.00) Tj"));
    }

    #[test]
    fn items_flow_onto_more_pages() {
        let details = details();
        let pdf = render(&details, &items(60), None);

        assert!(pdf.contains("/Count 4"));
        assert!(pdf.contains("(Itemized Hours (continued)) Tj"));
        assert!(pdf.contains("(Page 4 of 4) Tj"));
        assert!(pdf.contains("(90.0) Tj"));
    }

    #[test]
    fn long_description_keeps_totals_on_page() {
        let mut details = details();
        details.invoice.description = "Consulting ".repeat(1000);
        let total = InvoiceTotal::calculate(&details.invoice, &[]).unwrap();
        let document = InvoiceDocument::new(&details, &[], &total, None);

        let top = PANEL_TOP + PANEL_HEIGHT + SECTION_SPACING;
        let bottom = document.summary_table(&mut Canvas::new(), top);
        assert!(bottom + SECTION_SPACING + 2.0 * LINE_HEIGHT <= CONTENT_BOTTOM);

        let pdf = pdf_text(&document.render());
        assert!(pdf.contains("(Total Due) Tj"));
        assert!(pdf.contains("(Terms: 15 days net) Tj"));
    }

    #[test]
    fn tall_item_row_clamped_to_page() {
        let details = details();
        let mut long = item("2024-02-13", dec!(3));
        long.description = "Refactoring ".repeat(2000);
        let items = vec![long, item("2024-02-14", dec!(1))];
        let total = InvoiceTotal::calculate(&details.invoice, &items).unwrap();
        let document = InvoiceDocument::new(&details, &items, &total, None);

        assert_eq!(document.item_pages().len(), 2);
        let pdf = pdf_text(&document.render());
        assert!(pdf.contains("(Feb 14, 2024) Tj"));
        assert!(pdf.contains("(Page 3 of 3) Tj"));
    }

    #[test]
    fn clamp_keeps_first_lines() {
        let table = Table::new(&ITEM_COLUMNS);
        let description = "word ".repeat(500);
        let cells = table.row(&["Feb 13, 2024", "1.0", description.as_str()]);
        let y = 200.0;

        let clamped = Table::clamp(cells.clone(), y, CONTENT_BOTTOM);
        assert!(y + Table::height(&clamped) <= CONTENT_BOTTOM);
        assert_eq!(clamped[0], cells[0]);
        assert_eq!(clamped[2][0], cells[2][0]);

        let short = table.row(&["Feb 13, 2024", "1.0", "Planning"]);
        assert_eq!(Table::clamp(short.clone(), y, CONTENT_BOTTOM), short);
    }

    #[test]
    fn empty_timesheet_still_has_items_page() {
        let details = details();
        let pdf = render(&details, &[], None);
        assert!(pdf.contains("/Count 2"));
        assert!(pdf.contains("(0.0) Tj"));
    }

    #[test]
    fn logo_on_every_page() {
        let details = details();
        let logo = Logo::from_bytes(logo::tests::png_bytes()).unwrap();
        let pdf = render(&details, &items(1), Some(&logo));

        assert_eq!(pdf.matches("/Im0 Do").count(), 2);
        assert!(pdf.contains("/SMask"));
    }

    #[test]
    fn header_moves_for_logo() {
        let details = details();
        let total = InvoiceTotal::calculate(&details.invoice, &[]).unwrap();
        let without = InvoiceDocument::new(&details, &[], &total, None);
        assert_eq!(without.header_x(), 12.0);

        let logo = Logo::from_bytes(logo::tests::png_bytes()).unwrap();
        let with = InvoiceDocument::new(&details, &[], &total, Some(&logo));
        assert_eq!(with.header_x(), 30.0);
    }
}
