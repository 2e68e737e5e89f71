use crate::{
    data::student::{Student, StudentDraft, TextInput, YearLevelInput},
    error::{CsvFlushSnafu, CsvSnafu, HtmlResult, MultipartSnafu, RollcallError, RollcallResult},
    maud_conveniences::{
        ToastKind, errors_list, form_submit_button, render_table, subsubtitle, title, toast,
    },
    state::RollcallState,
};
use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use jiff::Zoned;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub const CSV_HEADERS: [&str; 7] = [
    "Student ID",
    "Full Name",
    "Gender",
    "Email",
    "Program",
    "Year Level",
    "University",
];

#[derive(Serialize)]
struct CsvExportRow<'a> {
    student_id: &'a str,
    full_name: &'a str,
    gender: &'a str,
    email: &'a str,
    program: &'a str,
    year_level: u8,
    university: &'a str,
}

/// Accepts both the export headers and the API's camelCase keys.
#[derive(Deserialize)]
struct CsvImportRow {
    #[serde(rename = "Student ID", alias = "studentId")]
    student_id: Option<String>,
    #[serde(rename = "Full Name", alias = "fullName")]
    full_name: Option<String>,
    #[serde(rename = "Gender", alias = "gender")]
    gender: Option<String>,
    #[serde(rename = "Email", alias = "email")]
    email: Option<String>,
    #[serde(rename = "Program", alias = "program")]
    program: Option<String>,
    #[serde(rename = "Year Level", alias = "yearLevel")]
    year_level: Option<YearLevelInput>,
    #[serde(rename = "University", alias = "university")]
    university: Option<String>,
}

impl From<CsvImportRow> for StudentDraft {
    fn from(
        CsvImportRow {
            student_id,
            full_name,
            gender,
            email,
            program,
            year_level,
            university,
        }: CsvImportRow,
    ) -> Self {
        Self {
            student_id: student_id.map(TextInput::from),
            full_name: full_name.map(TextInput::from),
            gender: gender.map(TextInput::from),
            email: email.map(TextInput::from),
            program: program.map(TextInput::from),
            year_level,
            university: university.map(TextInput::from),
        }
    }
}

pub fn students_to_csv(students: &[Student]) -> RollcallResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    wtr.write_record(CSV_HEADERS).context(CsvSnafu)?;
    for student in students {
        wtr.serialize(CsvExportRow {
            student_id: &student.student_id,
            full_name: &student.full_name,
            gender: student.gender.as_str(),
            email: &student.email,
            program: &student.program,
            year_level: student.year_level,
            university: &student.university,
        })
        .context(CsvSnafu)?;
    }

    wtr.into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context(CsvFlushSnafu)
}

/// Reads every row it can, collecting per-row syntax problems instead of stopping at the first.
pub fn drafts_from_csv(
    bytes: &[u8],
    drafts: &mut Vec<StudentDraft>,
    errors: &mut Vec<String>,
) {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    for record in rdr.deserialize::<CsvImportRow>() {
        match record {
            Ok(row) => drafts.push(row.into()),
            Err(source) => errors.push(format!("Error with CSVs: {source}")),
        }
    }
}

async fn read_uploaded_csvs(
    mut multipart: Multipart,
) -> RollcallResult<(Vec<StudentDraft>, Vec<String>)> {
    let mut syntax_errors = vec![];
    let mut drafts = vec![];
    loop {
        let Some(field) = multipart.next_field().await.context(MultipartSnafu)? else {
            break;
        };

        let bytes = field.bytes().await.context(MultipartSnafu)?;
        drafts_from_csv(bytes.as_ref(), &mut drafts, &mut syntax_errors);
    }
    Ok((drafts, syntax_errors))
}

pub async fn get_import_export_page(State(state): State<RollcallState>) -> Markup {
    state.render(html! {
        div class="mx-auto flex flex-row justify-center p-2 m-2 rounded gap-x-8" {
            div class="rounded shadow-xl flex flex-col p-4 m-2 bg-gray-800" {
                (title(html!{p class="text-pink-400" {"Export"}}))
                p class="mb-4 text-gray-300" {"Download every student as a CSV file."}
                a href="/export.csv" class="bg-pink-600 hover:bg-pink-700 font-bold py-2 px-4 rounded text-center" {
                    "Download as CSV"
                }
            }

            div class="rounded shadow-xl flex flex-col p-4 m-2 bg-gray-800" {
                (title(html!{p class="text-pink-400" {"Import"}}))

                div id="import_students_form" {
                    (render_table(
                        subsubtitle("CSV Format"),
                        ["Column", "Example", "Required"],
                        vec![
                            [html!{"Student ID"}, html!{"S12345"}, html!{"✅"}],
                            [html!{"Full Name"}, html!{"Jane Doe"}, html!{"✅"}],
                            [html!{"Gender"}, html!{"Female"}, html!{"✅"}],
                            [html!{"Email"}, html!{"jane@example.com"}, html!{"✅"}],
                            [html!{"Program"}, html!{"Biology"}, html!{"✅"}],
                            [html!{"Year Level"}, html!{"2"}, html!{"✅"}],
                            [html!{"University"}, html!{"State University"}, html!{"✅"}],
                        ]
                    ))
                    p class="italic" {"NB: camelCase headers (studentId, fullName, ...) work too. Nothing is imported unless every row is valid."}
                    br;

                    form hx-put="/internal/import" hx-swap="innerHTML" hx-target="#import_students_form" hx-encoding="multipart/form-data" {
                        label for="students_csv" class="block text-sm font-medium text-gray-400 mb-2" {"Upload Students CSV"}
                        input multiple type="file" name="students_csv" id="students_csv" accept=".csv" class="block w-full text-sm text-gray-300 file:mr-4 file:py-2 file:px-4 file:rounded file:border-0 file:text-sm file:font-semibold file:bg-violet-50 file:text-violet-700 hover:file:bg-violet-100 mb-4";

                        (form_submit_button(Some("Import Students")))
                    }
                }
            }
        }
    })
}

pub async fn get_export_csv(State(state): State<RollcallState>) -> HtmlResult<Response> {
    let students = state.list().await?;
    let csv = students_to_csv(&students)?;
    let file_name = format!("students-{}.csv", Zoned::now().date());

    info!(count = students.len(), "Exported students");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

pub async fn put_import_students(
    State(state): State<RollcallState>,
    multipart: Multipart,
) -> HtmlResult<Markup> {
    let (drafts, syntax_errors) = read_uploaded_csvs(multipart).await?;

    if !syntax_errors.is_empty() {
        return Ok(errors_list(
            Some("The following syntax errors were found in your CSV:"),
            syntax_errors,
        ));
    }

    match state.create_many(&drafts).await {
        Ok(created) => Ok(html! {
            p class="text-italic p-4" {"Successfully imported " (created.len()) " students."}
            a href="/app" class="underline hover:text-blue-400" {"Back to the dashboard"}
            (toast("Import complete!", ToastKind::Success))
        }),
        Err(RollcallError::ImportRejected { problems }) => Ok(errors_list(
            Some("Nothing was imported. Please fix these rows:"),
            problems,
        )),
        Err(e) => Err(e.into()),
    }
}
