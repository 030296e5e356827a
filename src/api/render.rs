//! Page Rendering
//!
//! Server-side HTML for the OKR page, rendered with Leptos. Text and
//! attribute values are escaped by the renderer.

use leptos::*;

use crate::model::{KeyResult, Objective};
use crate::view::{FormState, Notice, NoticeKind, ViewState};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; color: #222; }
.page { max-width: 900px; margin: 40px auto; padding: 16px; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.card { border: 1px solid #eee; border-radius: 8px; padding: 16px; }
.card h3 { margin-top: 0; }
label { display: block; margin-bottom: 8px; }
.label { font-size: 12px; color: #555; margin-bottom: 4px; }
input, select { width: 100%; padding: 8px 10px; border: 1px solid #ddd; border-radius: 6px; box-sizing: border-box; }
.list { margin-top: 24px; }
.list h3 { margin-top: 0; }
.objectives { display: grid; gap: 12px; }
.title { font-weight: 600; }
.owner { color: #666; font-size: 13px; }
.kr-heading { margin-top: 8px; font-size: 14px; color: #333; }
.notice { padding: 10px 12px; border-radius: 6px; margin-bottom: 16px; }
.notice-error { background: #fdecea; color: #611a15; }
.notice-validation { background: #fff4e5; color: #663c00; }
"#;

/// Render the whole page.
///
/// `notice` is rendered once as an alert; it is not taken from `state`.
pub fn page(state: &ViewState, notice: Option<&Notice>) -> String {
    let state = state.clone();
    let notice = notice.cloned();
    let html = leptos::ssr::render_to_string(move || {
        view! { <OkrPage state=state notice=notice/> }
    });
    format!("<!DOCTYPE html>\n{}", html)
}

#[component]
fn OkrPage(state: ViewState, notice: Option<Notice>) -> impl IntoView {
    let loading = state.is_loading();
    let objective_form = state.form.clone();
    let key_result_form = state.form.clone();
    let objectives = state.objectives.clone();

    view! {
        <html lang="vi">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>"OKR cơ bản"</title>
                <style inner_html=STYLE></style>
            </head>
            <body>
                <div class="page">
                    <h2>"OKR cơ bản"</h2>
                    {notice.map(|notice| view! { <NoticeBanner notice=notice/> })}
                    <div class="grid">
                        <CreateObjectiveForm form=objective_form loading=loading/>
                        <CreateKeyResultForm
                            objectives=objectives
                            form=key_result_form
                            loading=loading
                        />
                    </div>
                    <ObjectiveList state=state/>
                </div>
            </body>
        </html>
    }
}

/// Banner plus a blocking browser alert
#[component]
fn NoticeBanner(notice: Notice) -> impl IntoView {
    let class = match notice.kind {
        NoticeKind::Error => "notice notice-error",
        NoticeKind::Validation => "notice notice-validation",
    };
    let alert = format!("window.alert({});", js_string(&notice.message));

    view! {
        <div class=class role="alert">{notice.message}</div>
        <script inner_html=alert></script>
    }
}

#[component]
fn TextField(
    label: &'static str,
    name: &'static str,
    value: String,
    placeholder: &'static str,
    #[prop(optional)]
    required: bool,
) -> impl IntoView {
    view! {
        <label>
            <div class="label">{label}</div>
            <input name=name value=value placeholder=placeholder required=required/>
        </label>
    }
}

#[component]
fn SubmitButton(label: &'static str, loading: bool) -> impl IntoView {
    view! {
        <button type="submit" disabled=loading>
            {if loading { "Đang xử lý..." } else { label }}
        </button>
    }
}

#[component]
fn CreateObjectiveForm(form: FormState, loading: bool) -> impl IntoView {
    view! {
        <form class="card" method="post" action="/objectives">
            <h3>"Tạo Objective"</h3>
            <TextField
                label="Tiêu đề"
                name="title"
                value=form.objective_title
                placeholder="VD: Tăng trưởng người dùng Q4"
                required=true
            />
            <TextField
                label="Owner (tuỳ chọn)"
                name="owner"
                value=form.objective_owner
                placeholder="VD: hong.vu"
            />
            <SubmitButton label="Thêm Objective" loading=loading/>
        </form>
    }
}

#[component]
fn CreateKeyResultForm(
    objectives: Vec<Objective>,
    form: FormState,
    loading: bool,
) -> impl IntoView {
    let selected = form.selected_objective;
    let options = objectives
        .into_iter()
        .map(|objective| {
            let is_selected = objective.id.as_str() == selected;
            view! {
                <option value=objective.id.to_string() selected=is_selected>
                    {objective.title}
                </option>
            }
        })
        .collect_view();

    view! {
        <form class="card" method="post" action="/key-results">
            <h3>"Thêm Key Result"</h3>
            <label>
                <div class="label">"Objective"</div>
                <select name="objective_id" required=true>
                    <option value="">"-- chọn Objective --"</option>
                    {options}
                </select>
            </label>
            <TextField
                label="Tiêu đề KR"
                name="title"
                value=form.key_result_title
                placeholder="VD: Tăng DAU lên 20%"
                required=true
            />
            <TextField
                label="Target (số, tuỳ chọn)"
                name="target"
                value=form.key_result_target
                placeholder="VD: 20"
            />
            <SubmitButton label="Thêm Key Result" loading=loading/>
        </form>
    }
}

#[component]
fn ObjectiveList(state: ViewState) -> impl IntoView {
    let content = if state.is_loading() {
        view! { <div>"Đang tải..."</div> }.into_view()
    } else if state.objectives.is_empty() {
        view! { <div>"Chưa có Objective nào"</div> }.into_view()
    } else {
        let cards = state
            .objectives
            .iter()
            .map(|objective| {
                let key_results = state.key_results.for_objective(&objective.id).to_vec();
                view! { <ObjectiveCard objective=objective.clone() key_results=key_results/> }
            })
            .collect_view();
        view! { <div class="objectives">{cards}</div> }.into_view()
    };

    view! {
        <div class="list">
            <h3>"Danh sách Objectives"</h3>
            {content}
        </div>
    }
}

#[component]
fn ObjectiveCard(objective: Objective, key_results: Vec<KeyResult>) -> impl IntoView {
    let owner = objective
        .owner
        .filter(|owner| !owner.is_empty())
        .map(|owner| view! { <div class="owner">{format!("Owner: {}", owner)}</div> });

    let items = if key_results.is_empty() {
        view! { <li>"Chưa có KR"</li> }.into_view()
    } else {
        key_results
            .into_iter()
            .map(|key_result| view! { <KeyResultItem key_result=key_result/> })
            .collect_view()
    };

    view! {
        <div class="card">
            <div class="title">{objective.title}</div>
            {owner}
            <div class="kr-heading">"Key Results:"</div>
            <ul>{items}</ul>
        </div>
    }
}

#[component]
fn KeyResultItem(key_result: KeyResult) -> impl IntoView {
    let target = key_result
        .target_value
        .map(|target| view! { <span>{format!(" — Target: {}", target)}</span> });

    view! { <li>{key_result.title}{target}</li> }
}

/// A JavaScript string literal that is safe inside a `<script>` element
fn js_string(text: &str) -> String {
    serde_json::to_string(text)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}
