use chrono::{Datelike, Utc};

use crate::store::StudentRecord;

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
        header { background: #ffffff; padding: 1.5rem; border-bottom: 1px solid #e2e8f0; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        header h1 { margin: 0; font-size: 1.4rem; }
        .user-bar { display: flex; align-items: center; gap: 1rem; font-size: 0.95rem; color: #475569; }
        .user-bar a { color: #b91c1c; text-decoration: none; font-weight: 600; }
        main { padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; box-sizing: border-box; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        table { width: 100%; border-collapse: collapse; margin-top: 1rem; }
        th, td { padding: 0.75rem 1rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        th { background: #f1f5f9; font-weight: 600; }
        td img { max-height: 48px; border-radius: 6px; }
        label { display: block; margin-top: 1.2rem; font-weight: 600; }
        input[type="text"], input[type="number"] { width: 100%; padding: 0.75rem; margin-top: 0.5rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; box-sizing: border-box; }
        input:focus { outline: none; border-color: #2563eb; box-shadow: 0 0 0 3px rgba(37, 99, 235, 0.12); }
        button { margin-top: 1.5rem; padding: 0.85rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #1d4ed8; }
        .danger { background: #dc2626; margin-top: 0; }
        .danger:hover { background: #b91c1c; }
        .actions { display: flex; gap: 0.5rem; align-items: center; }
        .actions a { color: #1d4ed8; text-decoration: none; font-weight: 600; }
        .add-link { display: inline-block; margin-top: 1rem; color: #1d4ed8; text-decoration: none; font-weight: 600; }
        .flash { margin-bottom: 1.5rem; padding: 0.85rem 1rem; border-radius: 8px; }
        .flash.success { background: #dcfce7; color: #166534; }
        .flash.error { background: #fee2e2; color: #b91c1c; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

pub fn render_login_page(notice_html: &str) -> String {
    let footer = render_footer();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Student Registry</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>{styles}
        body {{ display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; }}
        main {{ width: 100%; max-width: 420px; }}
    </style>
</head>
<body>
    <main>
        <section class="panel">
            <h1>Student Registry</h1>
            {notice_html}
            <form method="post" action="/auth/login">
                <label for="username">Username</label>
                <input id="username" type="text" name="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" required>
                <button type="submit">Sign in</button>
            </form>
        </section>
        {footer}
    </main>
</body>
</html>"#,
        styles = BASE_STYLES,
        notice_html = notice_html,
        footer = footer,
    )
}

pub fn render_records_page(
    username: &str,
    records: &[StudentRecord],
    flash_html: &str,
) -> String {
    let rows = if records.is_empty() {
        r#"<tr><td colspan="4">No student records yet.</td></tr>"#.to_string()
    } else {
        records
            .iter()
            .map(render_record_row)
            .collect::<Vec<_>>()
            .join("\n")
    };

    page_shell(
        username,
        &format!(
            r#"        {flash_html}
        <section class="panel">
            <h2>Students</h2>
            <a class="add-link" href="/home/addstudent">Add student</a>
            <table>
                <thead>
                    <tr><th>ID</th><th>Name</th><th>Photo</th><th>Actions</th></tr>
                </thead>
                <tbody>
{rows}
                </tbody>
            </table>
        </section>
"#,
            flash_html = flash_html,
            rows = rows,
        ),
    )
}

fn render_record_row(record: &StudentRecord) -> String {
    let photo = record
        .image_path
        .as_deref()
        .map(|url| format!(r#"<img src="{}" alt="student photo">"#, escape_html(url)))
        .unwrap_or_default();

    format!(
        r#"                    <tr>
                        <td>{id}</td>
                        <td>{name}</td>
                        <td>{photo}</td>
                        <td class="actions">
                            <a href="/home/addstudent?studentID={id}">Edit</a>
                            <form method="post" action="/home/delete">
                                <input type="hidden" name="StudentID" value="{id}">
                                <button class="danger" type="submit">Delete</button>
                            </form>
                        </td>
                    </tr>"#,
        id = record.id,
        name = escape_html(&record.name),
        photo = photo,
    )
}

pub fn render_student_form(username: &str, record: Option<&StudentRecord>) -> String {
    let heading = if record.is_some() {
        "Edit student"
    } else {
        "Add student"
    };
    let id_value = record
        .map(|r| r.id.to_string())
        .unwrap_or_default();
    let id_readonly = if record.is_some() { " readonly" } else { "" };
    let name_value = record
        .map(|r| escape_html(&r.name))
        .unwrap_or_default();
    let file_path_value = record
        .and_then(|r| r.image_path.as_deref())
        .map(escape_html)
        .unwrap_or_default();
    let edit_marker = if record.is_some() {
        r#"<input type="hidden" name="EditMode" value="1">"#
    } else {
        ""
    };

    page_shell(
        username,
        &format!(
            r#"        <section class="panel">
            <h2>{heading}</h2>
            <form method="post" action="/home/save" enctype="multipart/form-data">
                {edit_marker}
                <input type="hidden" name="FilePath" value="{file_path_value}">
                <label for="student-id">Student ID</label>
                <input id="student-id" type="number" name="StudentID" value="{id_value}"{id_readonly} required>
                <label for="name">Name</label>
                <input id="name" type="text" name="Name" value="{name_value}" required>
                <label for="file">Photo</label>
                <input id="file" type="file" name="File" accept="image/*">
                <button type="submit">Save</button>
            </form>
        </section>
"#,
            heading = heading,
            edit_marker = edit_marker,
            file_path_value = file_path_value,
            id_value = id_value,
            id_readonly = id_readonly,
            name_value = name_value,
        ),
    )
}

fn page_shell(username: &str, main_html: &str) -> String {
    let footer = render_footer();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Student Registry</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>{styles}</style>
</head>
<body>
    <header>
        <h1>Student Registry</h1>
        <div class="user-bar">
            <span>Signed in as <strong>{username}</strong></span>
            <a href="/auth/logout">Log out</a>
        </div>
    </header>
    <main>
{main_html}
        {footer}
    </main>
</body>
</html>"#,
        styles = BASE_STYLES,
        username = escape_html(username),
        main_html = main_html,
        footer = footer,
    )
}

/// Map a `status` query value onto the flash banner shown above the list.
pub fn compose_flash_message(status: Option<&str>) -> String {
    let Some(status) = status else {
        return String::new();
    };

    let (class, message) = match status {
        "saved" => ("success", "Record Saved Successfully"),
        "updated" => ("success", "Record Updated Successfully"),
        "deleted" => ("success", "Record Deleted Successfully"),
        "error" => ("error", "Error Occured"),
        _ => return String::new(),
    };

    format!(r#"<div class="flash {class}">{message}</div>"#)
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} Student Registry — internal demo</footer>"#,
        year = current_year
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_messages_map_known_statuses() {
        assert!(compose_flash_message(Some("saved")).contains("Record Saved Successfully"));
        assert!(compose_flash_message(Some("updated")).contains("Record Updated Successfully"));
        assert!(compose_flash_message(Some("deleted")).contains("Record Deleted Successfully"));
        assert!(compose_flash_message(Some("error")).contains("Error Occured"));
        assert!(compose_flash_message(Some("bogus")).is_empty());
        assert!(compose_flash_message(None).is_empty());
    }

    #[test]
    fn record_rows_escape_user_data() {
        let record = StudentRecord {
            id: 1,
            name: "<script>alert(1)</script>".to_string(),
            image_path: None,
        };

        let page = render_records_page("admin", std::slice::from_ref(&record), "");
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert"));
    }

    #[test]
    fn edit_form_carries_the_existing_image_path() {
        let record = StudentRecord {
            id: 3,
            name: "Grace".to_string(),
            image_path: Some("http://localhost:8080/home/get/abc.jpeg".to_string()),
        };

        let page = render_student_form("admin", Some(&record));
        assert!(page.contains(r#"name="EditMode""#));
        assert!(page.contains("http://localhost:8080/home/get/abc.jpeg"));
    }
}
