//! Interactive schedule planning: pick a tour, unlock its schedule, edit
//! activities and notes, save.

use std::sync::Arc;

use anyhow::Result;
use dialoguer::{Confirm, FuzzySelect, Input, Select};
use tourops_cli::render::{print_itinerary, tour_label};
use tourops_cli::HttpScheduleRepository;
use tourops_common::{TourQuery, TourRecord};
use tourops_itinerary::{
    render_print_html, ActivityKey, DayKind, EditMode, EditSession, ItineraryDay, ScheduleStore,
};

use super::Ctx;

type Session = EditSession<HttpScheduleRepository>;

enum Action {
    RequestEdit,
    AddActivity,
    ChangeTime,
    RemoveActivity,
    EditNote,
    DoneEditing,
    Save,
    Print,
    SwitchTour,
    Exit,
}

fn menu(mode: EditMode) -> Vec<(&'static str, Action)> {
    let mut items = Vec::new();
    match mode {
        EditMode::Editable => {
            items.push(("Add activity", Action::AddActivity));
            items.push(("Change activity time", Action::ChangeTime));
            items.push(("Remove activity", Action::RemoveActivity));
            items.push(("Edit note", Action::EditNote));
            items.push(("Done editing", Action::DoneEditing));
        }
        EditMode::Locked | EditMode::ConfirmPending => {
            items.push(("Edit schedule", Action::RequestEdit));
        }
    }
    items.push(("Save", Action::Save));
    items.push(("Print to HTML file", Action::Print));
    items.push(("Switch tour", Action::SwitchTour));
    items.push(("Exit", Action::Exit));
    items
}

pub async fn run(ctx: &Ctx) -> Result<()> {
    ctx.print_header(&format!("Schedule planning ({})", ctx.api.base_url()));

    let store = Arc::new(ScheduleStore::new(HttpScheduleRepository::new(ctx.api.clone())));
    let mut session = EditSession::new(store);

    let Some(tour) = pick_tour(ctx).await? else {
        return Ok(());
    };
    let days = session.select(tour.clone()).await;
    print_itinerary(&tour, &days);

    loop {
        println!();
        let items = menu(session.mode());
        let labels: Vec<&str> = items.iter().map(|(label, _)| *label).collect();
        let choice = Select::with_theme(ctx.theme())
            .with_prompt(mode_prompt(session.mode()))
            .items(&labels)
            .default(0)
            .interact()?;

        match items[choice].1 {
            Action::RequestEdit => request_edit(ctx, &mut session)?,
            Action::AddActivity => add_activity(ctx, &mut session)?,
            Action::ChangeTime => change_time(ctx, &mut session)?,
            Action::RemoveActivity => remove_activity(ctx, &mut session)?,
            Action::EditNote => edit_note(ctx, &mut session)?,
            Action::DoneEditing => {
                session.done_editing();
                ctx.print_info("Schedule locked.");
            }
            Action::Save => save(ctx, &mut session).await,
            Action::Print => print_html(ctx, &session)?,
            Action::SwitchTour => {
                if let Some(next) = pick_tour(ctx).await? {
                    let days = session.select(next.clone()).await;
                    print_itinerary(&next, &days);
                }
                continue;
            }
            Action::Exit => break,
        }

        if let Some(tour) = session.tour() {
            print_itinerary(tour, &session.itinerary());
        }
    }

    session.deselect();
    Ok(())
}

fn mode_prompt(mode: EditMode) -> &'static str {
    match mode {
        EditMode::Editable => "Editing (changes are kept locally until saved)",
        EditMode::ConfirmPending | EditMode::Locked => "Schedule is locked",
    }
}

async fn pick_tour(ctx: &Ctx) -> Result<Option<TourRecord>> {
    let name: String = Input::with_theme(ctx.theme())
        .with_prompt("Guest name filter (blank for all)")
        .allow_empty(true)
        .interact_text()?;

    let query = TourQuery {
        name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
        ..Default::default()
    };
    let tours = ctx.api.search_tours(&query).await?;
    if tours.is_empty() {
        ctx.print_warning("No tours found.");
        return Ok(None);
    }

    let labels: Vec<String> = tours.iter().map(tour_label).collect();
    let choice = FuzzySelect::with_theme(ctx.theme())
        .with_prompt("Tour")
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(choice.map(|i| tours[i].clone()))
}

fn request_edit(ctx: &Ctx, session: &mut Session) -> Result<()> {
    if let Err(e) = session.request_edit() {
        ctx.print_warning(&e.to_string());
        return Ok(());
    }

    let confirmed = Confirm::with_theme(ctx.theme())
        .with_prompt("This changes the guest's schedule. Enable editing?")
        .default(false)
        .interact()?;

    if confirmed {
        session.confirm_edit();
        ctx.print_success("Editing enabled.");
    } else {
        session.cancel_edit();
    }
    Ok(())
}

/// Middle days only. Arrival and departure rows never carry activities.
fn pick_middle_day(ctx: &Ctx, days: &[ItineraryDay]) -> Result<Option<usize>> {
    let middle: Vec<usize> = days
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind == DayKind::Middle)
        .map(|(i, _)| i)
        .collect();
    if middle.is_empty() {
        ctx.print_warning("This stay has no activity days.");
        return Ok(None);
    }

    let labels: Vec<&str> = middle.iter().map(|&i| days[i].day_label.as_str()).collect();
    let choice = Select::with_theme(ctx.theme())
        .with_prompt("Day")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|c| middle[c]))
}

fn pick_activity(ctx: &Ctx, day: &ItineraryDay) -> Result<Option<usize>> {
    if day.activities.is_empty() {
        ctx.print_warning("No activities on this day.");
        return Ok(None);
    }
    let labels: Vec<String> = day
        .activities
        .iter()
        .map(|a| format!("{} {}", a.name, a.timings.first().map(String::as_str).unwrap_or("")))
        .collect();
    Ok(Select::with_theme(ctx.theme())
        .with_prompt("Activity")
        .items(&labels)
        .default(0)
        .interact_opt()?)
}

fn add_activity(ctx: &Ctx, session: &mut Session) -> Result<()> {
    let days = session.itinerary();
    let Some(day) = pick_middle_day(ctx, &days)? else {
        return Ok(());
    };

    let names: Vec<&str> = ActivityKey::ALL.iter().map(|k| k.entry().name).collect();
    let Some(choice) = Select::with_theme(ctx.theme())
        .with_prompt("Activity")
        .items(&names)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    session.add_activity(day, ActivityKey::ALL[choice])?;
    Ok(())
}

fn change_time(ctx: &Ctx, session: &mut Session) -> Result<()> {
    let days = session.itinerary();
    let Some(day) = pick_middle_day(ctx, &days)? else {
        return Ok(());
    };
    let Some(index) = pick_activity(ctx, &days[day])? else {
        return Ok(());
    };

    let name = &days[day].activities[index].name;
    let Some(key) = ActivityKey::from_display_name(name) else {
        ctx.print_warning(&format!("{name} is not in the activity catalog."));
        return Ok(());
    };
    let entry = key.entry();
    let Some(slot) = Select::with_theme(ctx.theme())
        .with_prompt("Time slot")
        .items(entry.timings)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    session.set_activity(day, index, entry.with_timing(slot))?;
    Ok(())
}

fn remove_activity(ctx: &Ctx, session: &mut Session) -> Result<()> {
    let days = session.itinerary();
    let Some(day) = pick_middle_day(ctx, &days)? else {
        return Ok(());
    };
    let Some(index) = pick_activity(ctx, &days[day])? else {
        return Ok(());
    };

    session.set_activity(day, index, None)?;
    Ok(())
}

fn edit_note(ctx: &Ctx, session: &mut Session) -> Result<()> {
    let days = session.itinerary();
    let labels: Vec<&str> = days.iter().map(|d| d.day_label.as_str()).collect();
    let Some(day) = Select::with_theme(ctx.theme())
        .with_prompt("Day")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    let note: String = Input::with_theme(ctx.theme())
        .with_prompt("Note")
        .with_initial_text(days[day].note.clone())
        .allow_empty(true)
        .interact_text()?;

    session.set_note(day, &note)?;
    Ok(())
}

async fn save(ctx: &Ctx, session: &mut Session) {
    match session.save().await {
        Ok(()) => ctx.print_success("Schedule saved."),
        Err(e) if e.is_retryable() => {
            ctx.print_warning(&format!("{e}. Your changes are kept; choose Save to retry."))
        }
        Err(e) => ctx.print_warning(&e.to_string()),
    }
}

fn print_html(ctx: &Ctx, session: &Session) -> Result<()> {
    let Some(tour) = session.tour() else {
        return Ok(());
    };
    let path: String = Input::with_theme(ctx.theme())
        .with_prompt("Output file")
        .default(format!("itinerary-{}.html", tour.id))
        .interact_text()?;

    std::fs::write(&path, render_print_html(tour, &session.itinerary()))?;
    ctx.print_success(&format!("Wrote {path}"));
    Ok(())
}
