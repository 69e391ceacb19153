use super::*;

const PORTFOLIO_HTML: &str = r#"
    <body>
      <nav class='navbar' data-top='0' data-height='70'>
        <a href='#home' class='logo'>AK</a>
        <ul class='nav-menu'>
          <li><a href='#home' class='nav-link'>Home</a></li>
          <li><a href='#about' class='nav-link'>About</a></li>
          <li><a href='#contact' class='nav-link'>Contact</a></li>
        </ul>
        <div class='hamburger'><span></span><span></span><span></span></div>
      </nav>
      <section id='home' data-top='0' data-height='800'>
        <div class='hero-content' data-top='200' data-height='400'>
          <h1>Hello</h1>
        </div>
      </section>
      <section id='about' data-top='800' data-height='700'>
        <span class='stat-number' data-target='42' data-top='900' data-height='40'>0</span>
        <span class='gpa-number' data-target='3.75' data-top='950' data-height='40'>0</span>
      </section>
      <section id='contact' data-top='1500' data-height='500'>
        <form class='contact-form'>
          <input type='text' name='name'>
          <textarea name='message'></textarea>
          <button type='submit'>Send</button>
        </form>
      </section>
    </body>
    "#;

#[test]
fn page_load_reveals_visible_sections_and_hides_the_rest() -> Result<()> {
    let page = Page::from_html(PORTFOLIO_HTML)?;

    page.assert_style("#home", "opacity", "1")?;
    page.assert_style("#home", "transform", "translateY(0)")?;
    page.assert_style("#about", "opacity", "0")?;
    page.assert_style("#about", "transform", "translateY(30px)")?;
    page.assert_style(
        "#about",
        "transition",
        "opacity 0.6s ease, transform 0.6s ease",
    )?;
    page.assert_style("#contact", "opacity", "0")?;
    Ok(())
}

#[test]
fn navbar_gains_scrolled_class_past_threshold() -> Result<()> {
    let mut page = Page::from_html("<body><nav class='navbar'></nav></body>")?;

    page.assert_class(".navbar", "scrolled", false)?;
    page.scroll_to(50)?;
    page.assert_class(".navbar", "scrolled", false)?;
    page.scroll_to(51)?;
    page.assert_class(".navbar", "scrolled", true)?;
    page.scroll_to(0)?;
    page.assert_class(".navbar", "scrolled", false)?;
    Ok(())
}

#[test]
fn scroll_is_clamped_at_zero() -> Result<()> {
    let mut page = Page::from_html("<body><div id='x'></div></body>")?;

    page.scroll_by(-500)?;
    assert_eq!(page.scroll_y(), 0);
    page.scroll_to(-10)?;
    assert_eq!(page.scroll_y(), 0);
    page.scroll_to(120)?;
    page.scroll_by(-40)?;
    assert_eq!(page.scroll_y(), 80);
    Ok(())
}

#[test]
fn hamburger_toggles_menu_and_locks_body_scroll() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.click(".hamburger")?;
    page.assert_class(".hamburger", "active", true)?;
    page.assert_class(".nav-menu", "active", true)?;
    page.assert_style("body", "overflow", "hidden")?;

    page.click(".hamburger")?;
    page.assert_class(".hamburger", "active", false)?;
    page.assert_class(".nav-menu", "active", false)?;
    page.assert_style("body", "overflow", "")?;
    Ok(())
}

#[test]
fn nav_link_click_closes_menu_and_restores_overflow() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.click(".hamburger")?;
    page.assert_style("body", "overflow", "hidden")?;

    page.click("a[href='#about']")?;
    page.assert_class(".hamburger", "active", false)?;
    page.assert_class(".nav-menu", "active", false)?;
    page.assert_style("body", "overflow", "")?;
    assert_eq!(page.scroll_y(), 720);
    page.assert_class(".navbar", "scrolled", true)?;
    page.assert_class("a[href='#about']", "active", true)?;
    Ok(())
}

#[test]
fn outside_click_closes_menu_and_restores_overflow() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.click(".hamburger")?;
    page.assert_style("body", "overflow", "hidden")?;

    page.click("#home h1")?;
    page.assert_class(".hamburger", "active", false)?;
    page.assert_class(".nav-menu", "active", false)?;
    page.assert_style("body", "overflow", "")?;
    assert_eq!(page.scroll_y(), 0);
    Ok(())
}

#[test]
fn click_inside_open_menu_keeps_it_open() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.click(".hamburger")?;
    page.click(".nav-menu")?;
    page.assert_class(".nav-menu", "active", true)?;
    page.assert_style("body", "overflow", "hidden")?;
    Ok(())
}

#[test]
fn anchor_scroll_offsets_by_fixed_header_allowance() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.click("a[href='#about']")?;
    assert_eq!(page.scroll_y(), 720);

    // Top section sits above the header allowance; the offset clamps at 0.
    page.click("a[href='#home']")?;
    assert_eq!(page.scroll_y(), 0);
    Ok(())
}

#[test]
fn anchor_to_missing_target_does_not_scroll() -> Result<()> {
    let html = r#"
        <body>
          <a id='ghost' href='#nowhere'>ghost</a>
          <a id='bare' href='#'>bare</a>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.click("#ghost")?;
    assert_eq!(page.scroll_y(), 0);
    page.click("#bare")?;
    assert_eq!(page.scroll_y(), 0);
    Ok(())
}

#[test]
fn click_on_anchor_descendant_resolves_the_anchor() -> Result<()> {
    let html = r#"
        <body>
          <a href='#target' class='nav-link'><span id='label'>go</span></a>
          <section id='target' data-top='500' data-height='300'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.click("#label")?;
    assert_eq!(page.scroll_y(), 420);
    Ok(())
}

#[test]
fn logo_click_overrides_anchor_destination() -> Result<()> {
    let html = r#"
        <body>
          <a href='#away' class='logo'>logo</a>
          <section id='away' data-top='900' data-height='300'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.scroll_to(400)?;
    page.click(".logo")?;
    assert_eq!(page.scroll_y(), 0);
    Ok(())
}

#[test]
fn stat_counter_animates_to_integer_target() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.assert_text(".stat-number", "0")?;
    page.scroll_to(300)?;
    page.flush()?;
    page.assert_text(".stat-number", "42")?;
    assert_eq!(page.now_ms(), 2016);
    Ok(())
}

#[test]
fn gpa_counter_renders_two_decimals() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.flush()?;
    page.assert_text(".gpa-number", "3.75")?;
    Ok(())
}

#[test]
fn counter_progress_is_monotonic() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;
    page.scroll_to(300)?;

    let mut last = 0.0f64;
    while page.run_next_timer()? {
        let shown = page.text(".stat-number")?.parse::<f64>().unwrap_or(last);
        assert!(shown >= last, "counter regressed from {last} to {shown}");
        last = shown;
    }
    assert_eq!(last, 42.0);
    Ok(())
}

#[test]
fn counter_never_restarts_after_completion() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.flush()?;
    page.assert_text(".stat-number", "42")?;

    page.scroll_to(0)?;
    page.scroll_to(300)?;
    let counter_tasks = page
        .pending_timers()
        .into_iter()
        .filter(|timer| timer.kind == "counter-step")
        .count();
    assert_eq!(counter_tasks, 0);
    page.flush()?;
    page.assert_text(".stat-number", "42")?;
    Ok(())
}

#[test]
fn counter_with_unparseable_target_stays_inert() -> Result<()> {
    let html = r#"
        <body>
          <span class='stat-number' data-target='soon' data-top='100' data-height='40'>0</span>
          <span class='gpa-number' data-top='150' data-height='40'>0</span>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    assert!(page.pending_timers().is_empty());
    page.flush()?;
    page.assert_text(".stat-number", "0")?;
    page.assert_text(".gpa-number", "0")?;
    Ok(())
}

#[test]
fn counter_target_parses_leading_numeric_prefix() -> Result<()> {
    let html = r#"
        <body>
          <span class='stat-number' data-target='42abc' data-top='100' data-height='40'>0</span>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.flush()?;
    page.assert_text(".stat-number", "42")?;
    Ok(())
}

#[test]
fn late_first_frame_still_plays_full_duration() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.advance_time(1000)?;
    page.assert_text(".stat-number", "0")?;

    page.flush()?;
    page.assert_text(".stat-number", "42")?;
    // The ramp started at the first executed frame (1000), so it completes
    // on the first frame at or after 3000.
    assert_eq!(page.now_ms(), 3008);
    Ok(())
}

#[test]
fn cards_reveal_with_staggered_delays() -> Result<()> {
    let html = r#"
        <body>
          <div class='skill-card' id='c1' data-top='100' data-height='50'></div>
          <div class='project-card' id='c2' data-top='200' data-height='50'></div>
          <div class='timeline-item' id='c3' data-top='300' data-height='50'></div>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    let timers = page.pending_timers();
    assert_eq!(timers.len(), 3);
    assert!(timers.iter().all(|timer| timer.kind == "reveal-card"));
    assert_eq!(
        timers.iter().map(|timer| timer.due_at).collect::<Vec<_>>(),
        vec![0, 100, 200]
    );
    page.assert_style("#c1", "opacity", "0")?;
    page.assert_style("#c1", "transform", "translateY(20px)")?;

    page.run_due_timers()?;
    page.assert_style("#c1", "opacity", "1")?;
    page.assert_style("#c1", "transform", "translateY(0)")?;
    page.assert_style("#c2", "opacity", "0")?;

    page.advance_time(100)?;
    page.assert_style("#c2", "opacity", "1")?;
    page.assert_style("#c3", "opacity", "0")?;

    page.advance_time(100)?;
    page.assert_style("#c3", "opacity", "1")?;
    Ok(())
}

#[test]
fn card_batches_restart_stagger_index() -> Result<()> {
    let html = r#"
        <body>
          <div class='skill-card' id='c1' data-top='100' data-height='50'></div>
          <div class='skill-card' id='c2' data-top='200' data-height='50'></div>
          <div class='skill-card' id='c3' data-top='2000' data-height='50'></div>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.flush()?;
    page.assert_style("#c2", "opacity", "1")?;
    page.assert_style("#c3", "opacity", "0")?;

    page.scroll_to(1400)?;
    let card_timers = page
        .pending_timers()
        .into_iter()
        .filter(|timer| timer.kind == "reveal-card")
        .collect::<Vec<_>>();
    assert_eq!(card_timers.len(), 1);
    // A later batch starts its stagger over at zero delay.
    assert_eq!(card_timers[0].due_at, page.now_ms());

    page.run_due_timers()?;
    page.assert_style("#c3", "opacity", "1")?;
    Ok(())
}

#[test]
fn sections_reveal_once_and_stay_revealed() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.assert_style("#about", "opacity", "1")?;

    page.scroll_to(0)?;
    page.assert_style("#about", "opacity", "1")?;
    page.assert_style("#about", "transform", "translateY(0)")?;
    Ok(())
}

#[test]
fn section_reveal_honors_shrunk_viewport_bottom() -> Result<()> {
    let html = r#"
        <body>
          <section id='deep' data-top='800' data-height='700'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.assert_style("#deep", "opacity", "0")?;
    page.scroll_to(119)?;
    page.assert_style("#deep", "opacity", "0")?;
    page.scroll_to(120)?;
    page.assert_style("#deep", "opacity", "1")?;
    Ok(())
}

#[test]
fn active_link_follows_scroll_position() -> Result<()> {
    let html = r#"
        <body>
          <a href='#a' class='nav-link'>A</a>
          <a href='#b' class='nav-link'>B</a>
          <section id='a' data-top='0' data-height='300'></section>
          <section id='b' data-top='300' data-height='400'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.assert_class("a[href='#a']", "active", true)?;
    page.assert_class("a[href='#b']", "active", false)?;

    page.scroll_to(450)?;
    page.assert_class("a[href='#a']", "active", false)?;
    page.assert_class("a[href='#b']", "active", true)?;
    Ok(())
}

#[test]
fn active_link_cleared_when_no_section_matches() -> Result<()> {
    let html = r#"
        <body>
          <a href='#a' class='nav-link'>A</a>
          <a href='#b' class='nav-link'>B</a>
          <section id='a' data-top='0' data-height='100'></section>
          <section id='b' data-top='500' data-height='100'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.scroll_to(200)?;
    page.assert_class("a[href='#a']", "active", false)?;
    page.assert_class("a[href='#b']", "active", false)?;
    Ok(())
}

#[test]
fn active_link_last_section_wins_on_overlap() -> Result<()> {
    let html = r#"
        <body>
          <a href='#a' class='nav-link'>A</a>
          <a href='#b' class='nav-link'>B</a>
          <section id='a' data-top='0' data-height='800'></section>
          <section id='b' data-top='700' data-height='700'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.scroll_to(600)?;
    page.assert_class("a[href='#a']", "active", false)?;
    page.assert_class("a[href='#b']", "active", true)?;
    Ok(())
}

#[test]
fn contact_form_submit_acknowledges_and_resets() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.type_text("input[name='name']", "Ada")?;
    page.type_text("textarea[name='message']", "Hello there")?;
    page.assert_value("input[name='name']", "Ada")?;

    page.click(".contact-form button")?;
    assert_eq!(
        page.take_alert_messages(),
        vec!["Thank you for your message! I will get back to you soon.".to_string()]
    );
    page.assert_value("input[name='name']", "")?;
    page.assert_value("textarea[name='message']", "")?;
    assert!(page.take_alert_messages().is_empty());
    Ok(())
}

#[test]
fn submit_on_form_selector_works_without_button() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.submit(".contact-form")?;
    assert_eq!(page.take_alert_messages().len(), 1);
    Ok(())
}

#[test]
fn unrelated_form_submission_is_default() -> Result<()> {
    let html = r#"
        <body>
          <form class='signup'>
            <input type='text' name='q' value='seed'>
            <button type='submit'>Go</button>
          </form>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.type_text("input[name='q']", "changed")?;
    page.click(".signup button")?;
    assert!(page.take_alert_messages().is_empty());
    page.assert_value("input[name='q']", "changed")?;
    Ok(())
}

#[test]
fn disabled_submit_button_does_nothing() -> Result<()> {
    let html = r#"
        <body>
          <form class='contact-form'>
            <input type='text' name='name'>
            <button type='submit' disabled>Send</button>
          </form>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.click(".contact-form button")?;
    assert!(page.take_alert_messages().is_empty());
    Ok(())
}

#[test]
fn type_text_rejects_non_input_targets() -> Result<()> {
    let mut page = Page::from_html("<body><div id='x'>text</div></body>")?;

    let err = page
        .type_text("#x", "nope")
        .expect_err("typing into a div should fail");
    assert!(matches!(err, Error::TypeMismatch { .. }));
    Ok(())
}

#[test]
fn type_text_skips_readonly_and_disabled_controls() -> Result<()> {
    let html = r#"
        <body>
          <input id='ro' type='text' readonly value='keep'>
          <input id='off' type='text' disabled value='fixed'>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.type_text("#ro", "changed")?;
    page.assert_value("#ro", "keep")?;
    page.type_text("#off", "changed")?;
    page.assert_value("#off", "fixed")?;
    Ok(())
}

#[test]
fn parallax_shifts_and_fades_hero() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.flush()?;
    page.assert_style(".hero-content", "transform", "translateY(90px)")?;
    page.assert_style(".hero-content", "opacity", "0.5")?;
    Ok(())
}

#[test]
fn parallax_coalesces_scroll_bursts() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(10)?;
    page.scroll_to(20)?;
    page.scroll_to(30)?;
    let frames = page
        .pending_timers()
        .into_iter()
        .filter(|timer| timer.kind == "parallax-frame")
        .count();
    assert_eq!(frames, 1);

    page.flush()?;
    page.assert_style(".hero-content", "transform", "translateY(9px)")?;
    page.assert_style(".hero-content", "opacity", "0.95")?;
    Ok(())
}

#[test]
fn parallax_freezes_beyond_viewport() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    page.flush()?;
    page.scroll_to(900)?;
    page.flush()?;
    // Styles keep the values from the last in-viewport frame.
    page.assert_style(".hero-content", "transform", "translateY(90px)")?;
    page.assert_style(".hero-content", "opacity", "0.5")?;

    page.scroll_to(0)?;
    page.flush()?;
    page.assert_style(".hero-content", "transform", "translateY(0px)")?;
    page.assert_style(".hero-content", "opacity", "1")?;
    Ok(())
}

#[test]
fn pending_timers_reports_sorted_queue() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    let timers = page.pending_timers();
    assert_eq!(
        timers.iter().map(|timer| timer.kind.as_str()).collect::<Vec<_>>(),
        vec!["parallax-frame", "counter-step", "counter-step"]
    );
    assert!(timers.iter().all(|timer| timer.due_at == 16));
    assert!(timers.windows(2).all(|pair| pair[0].order < pair[1].order));
    Ok(())
}

#[test]
fn run_next_timer_jumps_clock_to_due_time() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    assert!(!page.run_next_timer()?);
    assert_eq!(page.now_ms(), 0);

    page.scroll_to(300)?;
    assert!(page.run_next_timer()?);
    assert_eq!(page.now_ms(), 16);
    Ok(())
}

#[test]
fn run_next_due_timer_does_not_advance_the_clock() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.scroll_to(300)?;
    // Nothing is due yet at time zero.
    assert!(!page.run_next_due_timer()?);
    assert_eq!(page.now_ms(), 0);

    page.advance_time(16)?;
    assert_eq!(page.now_ms(), 16);
    Ok(())
}

#[test]
fn advance_time_rejects_negative_and_backward_targets() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    let err = page.advance_time(-1).expect_err("negative delta");
    assert!(matches!(err, Error::Runtime(_)));

    page.advance_time(100)?;
    let err = page.advance_time_to(50).expect_err("backward target");
    assert!(matches!(err, Error::Runtime(_)));
    Ok(())
}

#[test]
fn timer_step_limit_aborts_runaway_flush() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.set_timer_step_limit(3)?;
    page.scroll_to(300)?;
    let err = page.flush().expect_err("flush should hit the step limit");
    match err {
        Error::Runtime(msg) => assert!(msg.contains("possible runaway frame loop")),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(page.set_timer_step_limit(0).is_err());
    Ok(())
}

#[test]
fn frame_interval_is_configurable() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;

    page.set_frame_interval_ms(10)?;
    page.scroll_to(300)?;
    assert!(page.pending_timers().iter().all(|timer| timer.due_at == 10));
    assert!(page.set_frame_interval_ms(0).is_err());
    Ok(())
}

#[test]
fn set_metrics_retriggers_watchers() -> Result<()> {
    let html = r#"
        <body>
          <span class='stat-number' data-target='7' data-top='5000' data-height='40'>0</span>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    assert!(page.pending_timers().is_empty());
    page.set_metrics(".stat-number", 100, 40)?;
    assert_eq!(page.pending_timers().len(), 1);
    page.flush()?;
    page.assert_text(".stat-number", "7")?;
    Ok(())
}

#[test]
fn set_viewport_height_retriggers_watchers() -> Result<()> {
    let html = r#"
        <body>
          <section id='deep' data-top='900' data-height='700'></section>
        </body>
        "#;
    let mut page = Page::from_html(html)?;

    page.assert_style("#deep", "opacity", "0")?;
    page.set_viewport_height(1200)?;
    page.assert_style("#deep", "opacity", "1")?;

    assert!(page.set_viewport_height(0).is_err());
    assert!(Page::from_html_with_viewport("<body></body>", 0).is_err());
    Ok(())
}

#[test]
fn trace_logs_capture_events_scrolls_and_timers() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.click(".hamburger")?;
    page.scroll_to(100)?;
    page.flush()?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line == "[event] click target=div"));
    assert!(logs.iter().any(|line| line == "[event] menu toggle open=true"));
    assert!(logs.iter().any(|line| line == "[scroll] scroll_to from=0 to=100"));
    assert!(logs.iter().any(|line| line.starts_with("[timer] schedule frame")));
    assert!(logs.iter().any(|line| line.starts_with("[timer] flush")));

    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_category_toggles_filter_lines() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_timers(false);

    page.scroll_to(100)?;
    page.flush()?;
    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[scroll]")));
    assert!(!logs.iter().any(|line| line.starts_with("[timer]")));

    page.set_trace_events(false);
    page.click(".hamburger")?;
    let logs = page.take_trace_logs();
    assert!(!logs.iter().any(|line| line.starts_with("[event]")));
    Ok(())
}

#[test]
fn trace_log_ring_is_bounded() -> Result<()> {
    let mut page = Page::from_html("<body><div id='x'></div></body>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_timers(false);
    page.set_trace_log_limit(4)?;

    for offset in 1..=6 {
        page.scroll_to(offset)?;
    }

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[0], "[scroll] scroll_to from=2 to=3");
    assert_eq!(logs[3], "[scroll] scroll_to from=5 to=6");

    assert!(page.set_trace_log_limit(0).is_err());
    Ok(())
}

#[test]
fn observer_trace_lines_name_the_behavior() -> Result<()> {
    let mut page = Page::from_html(PORTFOLIO_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.scroll_to(300)?;
    let logs = page.take_trace_logs();
    assert!(logs
        .iter()
        .any(|line| line.starts_with("[observe] counter start group=stat")));
    assert!(logs
        .iter()
        .any(|line| line == "[observe] section reveal node=#about"));
    Ok(())
}

#[test]
fn dump_dom_serializes_sorted_attributes() -> Result<()> {
    let page = Page::from_html("<body><div id='x' class='a' data-top='5'>hi</div></body>")?;

    assert_eq!(
        page.dump_dom("#x")?,
        r#"<div class="a" data-top="5" id="x">hi</div>"#
    );
    Ok(())
}

#[test]
fn assert_helpers_report_mismatches() -> Result<()> {
    let page = Page::from_html("<body><div id='x' class='tag' style='color: red'>hi</div></body>")?;

    let err = page.assert_text("#x", "bye").expect_err("text mismatch");
    match err {
        Error::AssertionFailed {
            selector,
            expected,
            actual,
            dom_snippet,
        } => {
            assert_eq!(selector, "#x");
            assert_eq!(expected, "bye");
            assert_eq!(actual, "hi");
            assert!(dom_snippet.contains("<div"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(page.assert_class("#x", "missing", true).is_err());
    assert!(page.assert_style("#x", "color", "blue").is_err());
    let err = page.assert_exists("#ghost").expect_err("missing element");
    assert!(matches!(err, Error::SelectorNotFound(_)));
    Ok(())
}

#[test]
fn selector_engine_supports_required_forms() -> Result<()> {
    let page = Page::from_html(PORTFOLIO_HTML)?;

    page.assert_exists("section[id]")?;
    page.assert_exists("a[href^='#']")?;
    page.assert_exists("a[href$='about']")?;
    page.assert_exists("a[href*='bout']")?;
    page.assert_exists(".nav-menu > li")?;
    page.assert_exists("nav .nav-link")?;
    page.assert_exists("ul.nav-menu")?;
    page.assert_exists("*")?;

    let err = page.assert_exists("div:hover").expect_err("pseudo-class");
    assert!(matches!(err, Error::UnsupportedSelector(_)));
    let err = page.assert_exists("p.missing").expect_err("no match");
    assert!(matches!(err, Error::SelectorNotFound(_)));
    Ok(())
}

#[test]
fn duplicate_ids_resolve_to_first_element() -> Result<()> {
    let html = r#"
        <body>
          <div id='dup'>first</div>
          <div id='dup'>second</div>
        </body>
        "#;
    let page = Page::from_html(html)?;

    page.assert_text("#dup", "first")?;
    Ok(())
}

#[test]
fn html_parser_handles_doctype_comments_void_and_raw_text() -> Result<()> {
    let html = r#"<!DOCTYPE html>
        <html>
          <body>
            <!-- navigation placeholder -->
            <div id='content'>ok</div>
            <br>
            <img src='x.png'>
            <input id='agree' type='checkbox' checked>
            <script>var a = '<div>not-an-element</div>';</script>
          </body>
        </html>
        "#;
    let page = Page::from_html(html)?;

    page.assert_text("#content", "ok")?;
    page.assert_exists("img[src='x.png']")?;
    page.assert_exists("input[checked]")?;
    page.assert_text("script", "var a = '<div>not-an-element</div>';")?;

    let err = Page::from_html("<!-- oops").expect_err("unclosed comment");
    assert!(matches!(err, Error::HtmlParse(_)));
    Ok(())
}

#[test]
fn missing_close_tags_recover_at_the_enclosing_end_tag() -> Result<()> {
    let html = r#"
        <body>
          <div id='outer'><span id='inner'>x</div>
          <p id='after'>y</p>
        </body>
        "#;
    let page = Page::from_html(html)?;

    page.assert_text("#after", "y")?;
    assert!(page.dump_dom("#outer")?.contains(r#"<span id="inner">x</span>"#));
    Ok(())
}

#[test]
fn behaviors_are_inert_on_markup_missing_their_elements() -> Result<()> {
    let mut page = Page::from_html("<body><p id='lone'>hi</p></body>")?;

    page.click("#lone")?;
    page.scroll_to(400)?;
    page.flush()?;
    page.submit("#lone")?;
    page.assert_text("#lone", "hi")?;
    assert!(page.take_alert_messages().is_empty());
    Ok(())
}

#[test]
fn section_styles_merge_with_existing_declarations() -> Result<()> {
    let html = r#"
        <body>
          <section id='styled' style='color: red; background: url(a;b.png)' data-top='0' data-height='100'></section>
        </body>
        "#;
    let page = Page::from_html(html)?;

    page.assert_style("#styled", "color", "red")?;
    page.assert_style("#styled", "background", "url(a;b.png)")?;
    page.assert_style("#styled", "opacity", "1")?;
    Ok(())
}

#[test]
fn format_float_renders_like_script_number_to_string() {
    assert_eq!(dom_utils::format_float(0.0), "0");
    assert_eq!(dom_utils::format_float(-0.0), "0");
    assert_eq!(dom_utils::format_float(42.0), "42");
    assert_eq!(dom_utils::format_float(0.5), "0.5");
    assert_eq!(dom_utils::format_float(-3.25), "-3.25");
    assert_eq!(dom_utils::format_float(f64::NAN), "NaN");
    assert_eq!(dom_utils::format_float(f64::INFINITY), "Infinity");
    assert_eq!(dom_utils::format_float(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn format_fixed2_rounds_ties_away_from_zero() {
    assert_eq!(dom_utils::format_fixed2(0.0), "0.00");
    assert_eq!(dom_utils::format_fixed2(3.75), "3.75");
    assert_eq!(dom_utils::format_fixed2(3.85), "3.85");
    assert_eq!(dom_utils::format_fixed2(2.5), "2.50");
    assert_eq!(dom_utils::format_fixed2(12.3456), "12.35");
    assert_eq!(dom_utils::format_fixed2(0.005), "0.01");
    assert_eq!(dom_utils::format_fixed2(1.005), "1.00");
    assert_eq!(dom_utils::format_fixed2(-0.001), "-0.00");
    assert_eq!(dom_utils::format_fixed2(f64::NAN), "NaN");
}

#[test]
fn parse_float_prefix_follows_script_parsefloat() {
    assert_eq!(dom_utils::parse_float_prefix("42"), 42.0);
    assert_eq!(dom_utils::parse_float_prefix("  3.5rem"), 3.5);
    assert_eq!(dom_utils::parse_float_prefix("42abc"), 42.0);
    assert_eq!(dom_utils::parse_float_prefix(".5"), 0.5);
    assert_eq!(dom_utils::parse_float_prefix("+1.5"), 1.5);
    assert_eq!(dom_utils::parse_float_prefix("-2.5e2"), -250.0);
    assert_eq!(dom_utils::parse_float_prefix("1e+3"), 1000.0);
    // A dangling exponent marker is not consumed.
    assert_eq!(dom_utils::parse_float_prefix("1e"), 1.0);
    assert_eq!(dom_utils::parse_float_prefix("Infinity%"), f64::INFINITY);
    assert_eq!(dom_utils::parse_float_prefix("-Infinity"), f64::NEG_INFINITY);
    assert!(dom_utils::parse_float_prefix("abc").is_nan());
    assert!(dom_utils::parse_float_prefix("").is_nan());
    assert!(dom_utils::parse_float_prefix(".").is_nan());
    assert!(dom_utils::parse_float_prefix("+").is_nan());
}

#[test]
fn visible_ratio_respects_margin_and_zero_height() {
    let full = layout::ElementBox {
        top: 0,
        height: 100,
    };
    assert_eq!(layout::visible_ratio(full, 0, 800, 0), 1.0);

    let flat = layout::ElementBox { top: 0, height: 0 };
    assert_eq!(layout::visible_ratio(flat, 0, 800, 0), 0.0);

    let below = layout::ElementBox {
        top: 760,
        height: 100,
    };
    assert_eq!(layout::visible_ratio(below, 0, 800, 0), 0.4);
    // A negative margin shrinks the viewport bottom.
    assert_eq!(layout::visible_ratio(below, 0, 800, -50), 0.0);

    let above = layout::ElementBox {
        top: -50,
        height: 100,
    };
    assert_eq!(layout::visible_ratio(above, 0, 800, 0), 0.5);
}

#[test]
fn truncate_chars_appends_ellipsis() {
    assert_eq!(dom_utils::truncate_chars("abcdef", 4), "abcd...");
    assert_eq!(dom_utils::truncate_chars("abc", 3), "abc");
    assert_eq!(dom_utils::truncate_chars("abc", 5), "abc");
    assert_eq!(dom_utils::truncate_chars("", 2), "");
}
