//! Minimal HTML pages.

use axum::http::StatusCode;

use crate::pod::Student;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(title),
        body
    )
}

/// Registration form.
pub fn index_page() -> String {
    layout(
        "Pod registration",
        "<form method=\"post\" action=\"/\">\n\
         <label>What is your name? <input type=\"text\" name=\"name\" required></label>\n\
         <button type=\"submit\">Submit</button>\n\
         </form>",
    )
}

pub fn student_page(student: &Student) -> String {
    let body = format!(
        "<p>Hello, {}!</p>\n<dl>\n\
         <dt>Pod</dt><dd>{}</dd>\n\
         <dt>WAN address</dt><dd>{}</dd>\n\
         <dt>lo0</dt><dd>{}</dd>\n\
         <dt>st0</dt><dd>{}</dd>\n\
         </dl>",
        escape(&student.username),
        student.pod_number,
        escape(student.addr_wan.as_deref().unwrap_or("-")),
        student.addr_lo0(),
        student.addr_st0(),
    );
    layout(&format!("Pod {}", student.pod_number), &body)
}

/// Assignment table with an edit and a delete form per row.
pub fn admin_page(students: &[Student], max_pods: u32) -> String {
    let mut rows = String::new();
    for s in students {
        rows.push_str(&format!(
            "<tr>\n\
             <td><form id=\"edit-{id}\" method=\"post\" action=\"{url}\">\
             <input type=\"hidden\" name=\"id\" value=\"{id}\"></form>{id}</td>\n\
             <td><input form=\"edit-{id}\" type=\"number\" name=\"pod_number\" min=\"1\" max=\"{max}\" value=\"{pod}\"></td>\n\
             <td><input form=\"edit-{id}\" type=\"text\" name=\"username\" value=\"{name}\"></td>\n\
             <td><input form=\"edit-{id}\" type=\"text\" name=\"addr_wan\" value=\"{wan}\"></td>\n\
             <td>{lo0}</td><td>{st0}</td>\n\
             <td><button form=\"edit-{id}\" type=\"submit\">Save</button></td>\n\
             <td><form method=\"post\" action=\"/admin/delete/{pod}\"><button type=\"submit\">Delete</button></form></td>\n\
             </tr>\n",
            url = escape(&s.url()),
            id = s.id,
            max = max_pods,
            pod = s.pod_number,
            name = escape(&s.username),
            wan = escape(s.addr_wan.as_deref().unwrap_or("")),
            lo0 = s.addr_lo0(),
            st0 = s.addr_st0(),
        ));
    }

    let body = format!(
        "<p>{} of {} pods assigned</p>\n<table>\n\
         <tr><th>id</th><th>pod</th><th>user</th><th>WAN</th><th>lo0</th><th>st0</th><th></th><th></th></tr>\n\
         {}</table>",
        students.len(),
        max_pods,
        rows
    );
    layout("Admin", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    layout(&title, &format!("<p>{}</p>", escape(message)))
}
