//! HTML fragments for the bills pages

use billed_core::format::cmp_date_desc;
use billed_core::{CoreError, DisplayBill, FileChange, ModalContent, PageState, UploadedFile, EXPENSE_TYPES};
use billed_utils::{escape_html, format_number};

const ERROR_BOX: &str = "bg-red-50 border border-red-200 rounded-lg p-4 text-red-700";

/// Bill table, or the loading / error state of the bills page
pub fn bills_ui(state: &PageState<Vec<DisplayBill>>) -> String {
    match state {
        PageState::Idle | PageState::Loading => {
            r#"<div id='loading' data-testid='loading' class='text-gray-500 text-center py-12'>Chargement...</div>"#
                .to_string()
        }
        PageState::Failed(message) => format!(
            r#"<div data-testid='error-message' class='{}'>{}</div>"#,
            ERROR_BOX,
            escape_html(message)
        ),
        PageState::Loaded(bills) => bills_table(bills),
    }
}

fn bills_table(bills: &[DisplayBill]) -> String {
    let mut rows: Vec<&DisplayBill> = bills.iter().collect();
    rows.sort_by(|a, b| cmp_date_desc(&a.bill.date, &b.bill.date));

    let body: String = rows.iter().map(|b| bill_row(b)).collect();
    let empty = if rows.is_empty() {
        "<p class='text-gray-500 text-center py-8'>Aucune note de frais pour le moment.</p>"
    } else {
        ""
    };

    format!(
        r#"<table class='w-full text-sm'>
    <thead class='bg-gray-50 text-left text-gray-600'>
        <tr><th class='px-4 py-3'>Type</th><th class='px-4 py-3'>Nom</th><th class='px-4 py-3'>Date</th><th class='px-4 py-3 text-right'>Montant</th><th class='px-4 py-3'>Statut</th><th class='px-4 py-3'>Actions</th></tr>
    </thead>
    <tbody data-testid='tbody'>{}</tbody>
</table>{}"#,
        body, empty
    )
}

fn bill_row(bill: &DisplayBill) -> String {
    let badge = bill
        .bill
        .status()
        .map_or("bg-gray-100 text-gray-700", |s| s.badge_class());
    let status = bill.display_status.as_deref().unwrap_or(&bill.bill.status);
    let url = bill.bill.file_url.as_deref().unwrap_or_default();

    format!(
        r#"<tr class='border-t'>
    <td class='px-4 py-3'>{}</td>
    <td class='px-4 py-3'>{}</td>
    <td class='px-4 py-3'>{}</td>
    <td class='px-4 py-3 text-right'>{} €</td>
    <td class='px-4 py-3'><span class='px-2 py-1 rounded-full text-xs {}'>{}</span></td>
    <td class='px-4 py-3'><div class='icon-actions'><span data-testid='icon-eye' data-bill-url='{}' class='cursor-pointer' hx-get='/bills/receipt?url={}' hx-target='#modaleFile'>👁</span></div></td>
</tr>"#,
        escape_html(&bill.bill.expense_type),
        escape_html(&bill.bill.name),
        escape_html(&bill.display_date),
        format_number(bill.bill.amount),
        badge,
        escape_html(status),
        escape_html(url),
        urlencoding::encode(url)
    )
}

/// Receipt preview modal
pub fn modal_ui(content: &ModalContent) -> String {
    let body = match content {
        ModalContent::Image { url } => format!(
            r#"<div class='bill-proof-container flex justify-center'><img class='max-h-[70vh]' src='{}' alt='Bill' /></div>"#,
            escape_html(url)
        ),
        ModalContent::Link { url } => format!(
            r#"<p>Ce justificatif ne peut pas être affiché ici.</p><a class='text-indigo-600 underline' href='{}' target='_blank' rel='noopener'>Ouvrir le justificatif</a>"#,
            escape_html(url)
        ),
        ModalContent::Missing => {
            "<p class='text-gray-600'>Aucun justificatif n'est disponible pour cette note de frais.</p>".to_string()
        }
    };

    format!(
        r#"<div class='fixed inset-0 bg-black/50 flex items-center justify-center z-50' role='dialog'>
    <div class='bg-white rounded-xl shadow-lg w-full max-w-3xl'>
        <div class='flex items-center justify-between px-6 py-4 border-b'>
            <h5 class='text-lg font-semibold'>Justificatif</h5>
            <button type='button' class='text-gray-500 hover:text-gray-700' onclick="document.getElementById('modaleFile').innerHTML=''">✕</button>
        </div>
        <div class='p-6'>{}</div>
    </div>
</div>"#,
        body
    )
}

/// Bills page content: heading, "new bill" button, deferred table and modal slot
pub fn bills_page_ui() -> String {
    format!(
        r#"<div class='mb-6 flex items-center justify-between'>
    <h2 class='text-2xl font-bold'>Mes notes de frais</h2>
    <button type='button' data-testid='btn-new-bill' hx-post='/bills/new-click' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Nouvelle note de frais</button>
</div>
<div id='bills-content' hx-get='/bills/list' hx-trigger='load' class='bg-white rounded-xl shadow-sm overflow-hidden'>{}</div>
<div id='modaleFile'></div>"#,
        bills_ui(&PageState::Loading)
    )
}

/// New bill form
pub fn new_bill_form_ui() -> String {
    let options: String = EXPENSE_TYPES
        .iter()
        .map(|t| format!("<option>{}</option>", escape_html(t)))
        .collect();
    let input = "w-full px-3 py-2 border border-gray-300 rounded-lg";

    format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Envoyer une note de frais</h2></div>
<form data-testid='form-new-bill' hx-post='/bills' hx-target='#form-feedback' class='bg-white rounded-xl shadow-sm p-6 grid grid-cols-1 md:grid-cols-2 gap-6'>
    <div class='space-y-4'>
        <label class='block'>Type de dépense
            <select name='expense_type' data-testid='expense-type' required class='{input}'>{options}</select>
        </label>
        <label class='block'>Nom de la dépense
            <input type='text' name='expense_name' data-testid='expense-name' placeholder='Vol Paris Londres' class='{input}' />
        </label>
        <label class='block'>Date
            <input type='date' name='datepicker' data-testid='datepicker' required class='{input}' />
        </label>
        <label class='block'>Montant TTC
            <input type='number' name='amount' data-testid='amount' placeholder='348' required class='{input}' />
        </label>
        <div class='flex gap-2'>
            <label class='block flex-1'>TVA
                <input type='number' name='vat' data-testid='vat' placeholder='70' class='{input}' />
            </label>
            <label class='block w-24'>%
                <input type='number' name='pct' data-testid='pct' placeholder='20' class='{input}' />
            </label>
        </div>
    </div>
    <div class='space-y-4'>
        <label class='block'>Commentaire
            <textarea name='commentary' data-testid='commentary' rows='3' class='{input}'></textarea>
        </label>
        <label class='block'>Justificatif
            <input type='file' name='file' data-testid='file' required accept='.jpg,.jpeg,.png' hx-post='/bills/new/file' hx-encoding='multipart/form-data' hx-trigger='change' hx-target='#file-feedback' class='{input}' />
        </label>
        <div id='file-feedback'></div>
    </div>
    <div class='md:col-span-2 flex items-center gap-4'>
        <button type='submit' id='btn-send-bill' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Envoyer</button>
        <div id='form-feedback'></div>
    </div>
</form>"#,
        input = input,
        options = options
    )
}

/// Feedback under the file input after a receipt was picked.
///
/// An accepted receipt is carried to the submit request through hidden inputs.
pub fn file_feedback_ui(change: &FileChange) -> String {
    match change {
        FileChange::Uploaded { uploaded, .. } => uploaded_inputs(uploaded),
        FileChange::Rejected { input, error } | FileChange::UploadFailed { input, error } => format!(
            r#"<script>document.querySelector("[data-testid='file']").value = '{}';</script><p data-testid='file-error-message' class='text-sm text-red-600'>{}</p>"#,
            escape_html(&input.value),
            escape_html(&error.to_string())
        ),
    }
}

fn uploaded_inputs(uploaded: &UploadedFile) -> String {
    format!(
        r#"<input type='hidden' name='file_url' value='{}' /><input type='hidden' name='file_key' value='{}' /><input type='hidden' name='file_name' value='{}' /><p class='text-sm text-green-700'>Justificatif reçu : {}</p>"#,
        escape_html(&uploaded.file_url),
        escape_html(&uploaded.file_key),
        escape_html(&uploaded.file_name),
        escape_html(&uploaded.file_name)
    )
}

/// Inline error of a rejected submission
pub fn form_error_ui(error: &CoreError) -> String {
    format!(
        r#"<div data-testid='error-message' class='{}'>{}</div>"#,
        ERROR_BOX,
        escape_html(&error.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use billed_core::format::display_bill;
    use billed_core::{Bill, FileInput};

    fn bill(id: &str, date: &str, status: &str) -> DisplayBill {
        display_bill(Bill {
            id: id.to_string(),
            email: "a@a".to_string(),
            expense_type: "Transports".to_string(),
            name: format!("bill {}", id),
            amount: 1200,
            date: date.to_string(),
            vat: "20".to_string(),
            pct: 20,
            commentary: String::new(),
            file_url: Some(format!("https://localhost:3456/images/{}.jpg", id)),
            file_name: Some(format!("{}.jpg", id)),
            file_key: None,
            status: status.to_string(),
            comment_admin: None,
        })
    }

    #[test]
    fn test_rows_render_most_recent_first() {
        let state = PageState::Loaded(vec![
            bill("a", "2001-01-01", "refused"),
            bill("b", "2004-04-04", "pending"),
            bill("c", "not a date", "accepted"),
            bill("d", "2003-03-03", "accepted"),
        ]);
        let html = bills_ui(&state);

        let pos = |needle: &str| html.find(needle).unwrap();
        assert!(pos("2004-04-04") < pos("2003-03-03"));
        assert!(pos("2003-03-03") < pos("2001-01-01"));
        assert!(pos("2001-01-01") < pos("not a date"));
        assert!(html.contains("1 200 €"));
        assert!(html.contains("En attente"));
        assert_eq!(html.matches("data-testid='icon-eye'").count(), 4);
    }

    #[test]
    fn test_failed_state_shows_message() {
        let html = bills_ui(&PageState::Failed("Erreur 404".to_string()));
        assert!(html.contains("data-testid='error-message'"));
        assert!(html.contains("Erreur 404"));
        assert!(!html.contains("tbody"));
    }

    #[test]
    fn test_empty_and_loading_states() {
        let html = bills_ui(&PageState::Loaded(Vec::new()));
        assert!(html.contains("data-testid='tbody'></tbody>"));
        assert!(!html.contains("error-message"));

        assert!(bills_ui(&PageState::Loading).contains("Chargement"));
        assert!(bills_ui(&PageState::Idle).contains("Chargement"));
    }

    #[test]
    fn test_unknown_status_shown_raw() {
        let html = bills_ui(&PageState::Loaded(vec![bill("a", "2001-01-01", "archived")]));
        assert!(html.contains(">archived<"));
    }

    #[test]
    fn test_modal_variants() {
        let html = modal_ui(&ModalContent::Image { url: "https://x.tld/r.png".to_string() });
        assert!(html.contains("<img"));
        assert!(html.contains("https://x.tld/r.png"));

        let html = modal_ui(&ModalContent::Link { url: "https://x.tld/r.pdf".to_string() });
        assert!(html.contains("href='https://x.tld/r.pdf'"));
        assert!(!html.contains("<img"));

        assert!(modal_ui(&ModalContent::Missing).contains("Aucun justificatif"));
    }

    #[test]
    fn test_form_has_every_field() {
        let html = new_bill_form_ui();
        for id in [
            "form-new-bill",
            "expense-type",
            "expense-name",
            "datepicker",
            "amount",
            "vat",
            "pct",
            "commentary",
            "file",
        ] {
            assert!(html.contains(&format!("data-testid='{}'", id)), "missing {}", id);
        }
        assert!(html.contains("<option>Transports</option>"));
    }

    #[test]
    fn test_file_feedback() {
        let change = FileChange::Rejected {
            input: FileInput::default(),
            error: CoreError::UnsupportedFileType { extension: Some("pdf".to_string()) },
        };
        let html = file_feedback_ui(&change);
        assert!(html.contains("data-testid='file-error-message'"));
        assert!(html.contains("Le PDF n&#39;est pas pris en charge."));
        assert!(html.contains(".value = ''"));
        assert!(!html.contains("file_url"));
    }
}
