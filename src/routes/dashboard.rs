use crate::{
    data::{
        OptionalIdForm, parse_id,
        student::{Gender, Student, StudentDraft, text_of},
        validation::{FieldErrors, StudentField, YEAR_LEVELS},
    },
    error::{HtmlResult, RollcallError},
    maud_conveniences::{
        ToastKind, escape, form_submit_button, render_table, select_element,
        simple_form_element, stat_card, title, toast,
    },
    state::RollcallState,
    view::{StudentFilters, StudentsView},
};
use axum::{
    Form,
    extract::{Path, Query, State},
};
use maud::{Markup, html};
use uuid::Uuid;

const INPUT_CLASSES: &str = "shadow appearance-none border rounded py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

pub async fn get_dashboard(State(state): State<RollcallState>) -> HtmlResult<Markup> {
    let view = StudentsView::new(state.list().await?, StudentFilters::default());

    Ok(state.render(html! {
        div class="w-full max-w-6xl flex flex-col space-y-6" {
            div id="stats" {
                (render_stats(&view))
            }
            (render_filters(&view))
            div class="flex flex-row gap-6 items-start" {
                div id="students_table" class="flex-1" {
                    (render_students_table(&view))
                }
                div id="student_form" class="w-96 bg-gray-800 p-4 rounded shadow-md" {
                    (render_student_form(None, &StudentDraft::default(), &FieldErrors::default()))
                }
            }
        }
    }))
}

pub async fn internal_get_students(
    State(state): State<RollcallState>,
    Query(filters): Query<StudentFilters>,
) -> HtmlResult<Markup> {
    let view = StudentsView::new(state.list().await?, filters);

    Ok(html! {
        (render_students_table(&view))
        div id="stats" hx-swap-oob="true" {
            (render_stats(&view))
        }
        (render_program_filter(&view, true))
    })
}

pub async fn internal_get_student_form(
    State(state): State<RollcallState>,
    Query(OptionalIdForm { id }): Query<OptionalIdForm>,
) -> HtmlResult<Markup> {
    Ok(match id {
        Some(id) => {
            let student = state.get(id).await?;
            render_student_form(Some(id), &student.to_draft(), &FieldErrors::default())
        }
        None => render_student_form(None, &StudentDraft::default(), &FieldErrors::default()),
    })
}

pub async fn internal_get_random_student_form(State(state): State<RollcallState>) -> Markup {
    let draft = StudentDraft::random(&mut rand::rng(), state.sample_email_domain());

    html! {
        (render_student_form(None, &draft, &FieldErrors::default()))
        (toast("Random data generated!", ToastKind::Info))
    }
}

pub async fn internal_post_student_form(
    State(state): State<RollcallState>,
    Query(OptionalIdForm { id }): Query<OptionalIdForm>,
    Form(draft): Form<StudentDraft>,
) -> HtmlResult<Markup> {
    let result = match id {
        Some(id) => state.update(id, draft.clone()).await,
        None => state.create(&draft).await,
    };

    let errors = match result {
        Ok(student) => {
            let verb = if id.is_some() { "updated" } else { "added" };
            return Ok(html! {
                (render_student_form(None, &StudentDraft::default(), &FieldErrors::default()))
                (refreshing_students_table(true))
                (toast(format!("{} {verb}", student.full_name), ToastKind::Success))
            });
        }
        Err(RollcallError::ValidationFailed { errors }) => errors,
        Err(e @ RollcallError::DuplicateStudentId { .. }) => {
            let mut errors = FieldErrors::default();
            errors.insert(StudentField::StudentId, e.to_string());
            errors
        }
        Err(e) => return Err(e.into()),
    };

    Ok(html! {
        (render_student_form(id, &draft, &errors))
        (toast("Please fix the highlighted fields", ToastKind::Error))
    })
}

pub async fn internal_delete_student(
    State(state): State<RollcallState>,
    Path(id): Path<String>,
) -> HtmlResult<Markup> {
    let removed = state.delete(parse_id(&id)?).await?;

    Ok(html! {
        (refreshing_students_table(false))
        (toast(format!("{} deleted", removed.full_name), ToastKind::Success))
    })
}

/// A placeholder that immediately re-fetches the table with whatever the filter bar holds.
fn refreshing_students_table(out_of_band: bool) -> Markup {
    html! {
        div id="students_table" class="flex-1" hx-swap-oob=[out_of_band.then_some("true")] hx-get="/internal/students" hx-include="#filters" hx-trigger="load" {
            p class="italic text-gray-400" {"Refreshing..."}
        }
    }
}

fn render_stats(view: &StudentsView) -> Markup {
    let stats = view.stats();

    html! {
        div class="grid grid-cols-2 md:grid-cols-5 gap-4" {
            (stat_card("Students", stats.total))
            (stat_card("Male", stats.male))
            (stat_card("Female", stats.female))
            (stat_card("Other", stats.other))
            (stat_card("Programs", stats.programs))
        }
    }
}

fn render_program_filter(view: &StudentsView, out_of_band: bool) -> Markup {
    let selected = view.filters().program.as_str();

    html! {
        select id="filter_program" name="program" class=(INPUT_CLASSES) hx-swap-oob=[out_of_band.then_some("true")] {
            option value="" {"All programs"}
            @for program in view.programs() {
                option value=(program) selected[program == selected] {(program)}
            }
        }
    }
}

fn render_filters(view: &StudentsView) -> Markup {
    html! {
        form id="filters" class="flex flex-row flex-wrap gap-4 bg-gray-800 p-4 rounded shadow-md" hx-get="/internal/students" hx-target="#students_table" hx-trigger="input changed delay:300ms from:#search, change" {
            input type="search" id="search" name="search" placeholder="Search by name..." class=(INPUT_CLASSES) {}
            select name="gender" class=(INPUT_CLASSES) {
                option value="" {"All genders"}
                @for gender in Gender::ALL {
                    option value=(gender.as_str()) {(gender.as_str())}
                }
            }
            (render_program_filter(view, false))
            select name="year" class=(INPUT_CLASSES) {
                option value="" {"All years"}
                @for year in YEAR_LEVELS.0..=YEAR_LEVELS.1 {
                    option value=(year) {"Year " (year)}
                }
            }
        }
    }
}

fn render_students_table(view: &StudentsView) -> Markup {
    let filtered = view.filtered();
    let total = view.stats().total;

    html! {
        p class="text-sm text-gray-400 mb-2" {"Showing " (filtered.len()) " of " (total) " students"}
        @if filtered.is_empty() {
            div class="bg-gray-800 p-8 rounded shadow-md text-center" {
                (title("No students found"))
                p class="text-gray-400" {"Add a student with the form, or loosen the filters."}
            }
        } @else {
            (render_table(
                html! {},
                ["Student ID", "Full Name", "Gender", "Email", "Program", "Year", "University", ""],
                filtered.into_iter().map(student_row).collect(),
            ))
        }
    }
}

fn student_row(student: &Student) -> [Markup; 8] {
    [
        escape(&student.student_id),
        escape(&student.full_name),
        escape(student.gender.as_str()),
        escape(&student.email),
        escape(&student.program),
        escape(student.year_level.to_string()),
        escape(&student.university),
        html! {
            div class="flex flex-row space-x-2" {
                button class="bg-gray-700 hover:bg-gray-600 py-1 px-2 rounded" hx-get={"/internal/student_form?id=" (student.id)} hx-target="#student_form" {
                    "Edit"
                }
                button class="bg-red-700 hover:bg-red-800 py-1 px-2 rounded" hx-delete={"/internal/students/" (student.id)} hx-target="#students_table" hx-swap="outerHTML" hx-confirm={"Delete " (student.full_name) "?"} {
                    "Delete"
                }
            }
        },
    ]
}

fn render_student_form(
    editing: Option<Uuid>,
    draft: &StudentDraft,
    errors: &FieldErrors,
) -> Markup {
    let post_url = match editing {
        Some(id) => format!("/internal/student_form?id={id}"),
        None => "/internal/student_form".to_string(),
    };
    let year_options: Vec<String> = (YEAR_LEVELS.0..=YEAR_LEVELS.1)
        .map(|year| year.to_string())
        .collect();
    let selected_year = draft.year_level.as_ref().map(ToString::to_string);

    html! {
        @if editing.is_some() {
            (title("Edit Student"))
        } @else {
            (title("Add New Student"))
        }

        form hx-post=(post_url) hx-target="#student_form" {
            (simple_form_element("studentId", "Student ID", None, text_of(draft.student_id.as_ref()), errors.get(StudentField::StudentId)))
            (simple_form_element("fullName", "Full Name", None, text_of(draft.full_name.as_ref()), errors.get(StudentField::FullName)))
            (select_element(
                "gender",
                "Gender",
                "Select a gender",
                Gender::ALL.iter().map(|g| g.as_str()),
                text_of(draft.gender.as_ref()),
                errors.get(StudentField::Gender),
            ))
            (simple_form_element("email", "Email", Some("email"), text_of(draft.email.as_ref()), errors.get(StudentField::Email)))
            (simple_form_element("program", "Program", None, text_of(draft.program.as_ref()), errors.get(StudentField::Program)))
            (select_element(
                "yearLevel",
                "Year Level",
                "Select a year",
                year_options.iter().map(String::as_str),
                selected_year.as_deref(),
                errors.get(StudentField::YearLevel),
            ))
            (simple_form_element("university", "University", None, text_of(draft.university.as_ref()), errors.get(StudentField::University)))

            @if editing.is_some() {
                (form_submit_button(Some("Update Student")))
            } @else {
                (form_submit_button(Some("Add Student")))
            }
        }

        div class="flex flex-row space-x-2 mt-4" {
            @if editing.is_some() {
                button class="bg-gray-700 hover:bg-gray-600 py-2 px-4 rounded" hx-get="/internal/student_form" hx-target="#student_form" {
                    "Cancel"
                }
            } @else {
                button class="bg-purple-600 hover:bg-purple-700 py-2 px-4 rounded" hx-get="/internal/student_form/random" hx-target="#student_form" {
                    "Fill with random data"
                }
            }
        }
    }
}
