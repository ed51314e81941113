mod common;

use common::{date, test_opts};
use textnote_core::{ContentItem, SectionGettable, Template, TemplateError};

#[test]
fn dated_item_header_groups_indented_lines() {
    let opts = test_opts();
    let raw = "-^-[Sat] 19 Dec 2020-v-\n\n\
_p_TestSectionA_q_\n\n\n\n\
_p_TestSectionB_q_\n[2020-12-19]\n  first line\n  second line\n\
_p_TestSectionC_q_\n\n\n\n";
    let mut template = Template::new(&opts, date(2020, 12, 19));
    template.load_str(raw).unwrap();

    let items = template.section("TestSectionB").unwrap().contents();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].header, "[2020-12-19]");
    assert_eq!(items[0].text, "  first line\n  second line\n");
    assert!(template.section("TestSectionA").unwrap().contents().is_empty());
    assert!(template.section("TestSectionC").unwrap().contents().is_empty());
}

#[test]
fn undefined_section_is_rejected() {
    let opts = test_opts();
    let raw = "header\n_p_TestSectionA_q_\nx\n_p_Unknown_q_\ny\n";
    let mut template = Template::new(&opts, date(2020, 12, 19));
    let err = template.load_str(raw).unwrap_err();
    assert!(matches!(err, TemplateError::UndefinedSection(ref name) if name == "Unknown"));
    assert!(err.to_string().contains("undefined section"));
}

#[test]
fn render_then_load_round_trips_headerless_contents() {
    let opts = test_opts();
    let mut original = Template::new(&opts, date(2020, 12, 19));
    original
        .section_mut("TestSectionA")
        .unwrap()
        .set_contents(vec![ContentItem::new("- buy milk\n- call home\n")]);
    original
        .section_mut("TestSectionC")
        .unwrap()
        .set_contents(vec![ContentItem::new("meeting notes\n\nsecond paragraph\n")]);

    let mut reloaded = Template::new(&opts, date(2020, 12, 19));
    reloaded.load_str(&original.render()).unwrap();

    assert_eq!(reloaded.sections(), original.sections());
    assert_eq!(reloaded.render(), original.render());
}

#[test]
fn empty_template_round_trips_to_empty_sections() {
    let opts = test_opts();
    let original = Template::new(&opts, date(2020, 12, 19));
    let mut reloaded = Template::new(&opts, date(2020, 12, 19));
    reloaded.load_str(&original.render()).unwrap();
    assert!(reloaded.sections().iter().all(|s| s.contents().is_empty()));
}

#[test]
fn first_content_line_matches_cursor_line() {
    let mut opts = test_opts();
    opts.file.cursor_line = 4;
    let template = Template::new(&opts, date(2020, 12, 19));
    let rendered = template.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[template.file_cursor_line() - 2], "_p_TestSectionA_q_");
}
