//! The static landing page.

/// Markup served for every request that is not `GET /log`.
///
/// Self-contained: the form posts nothing, the button's script issues
/// `GET /log?message=...` with the input value URL-encoded and logs the
/// reply in the browser console.
pub const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>lanbell</title>
    <style>
        body {
            font-family: system-ui, sans-serif;
            background-color: #f5f5f5;
            color: #222;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
        }
        .card {
            background: #fff;
            border-radius: 8px;
            box-shadow: 0 1px 6px rgba(0, 0, 0, 0.15);
            max-width: 420px;
            padding: 24px;
            text-align: center;
        }
        h1 {
            color: #2563eb;
            margin-top: 0;
        }
        input {
            border: 1px solid #ccc;
            border-radius: 4px;
            font-size: 1em;
            padding: 8px;
            width: 80%;
        }
        button {
            background-color: #2563eb;
            border: none;
            border-radius: 4px;
            color: #fff;
            cursor: pointer;
            font-size: 1em;
            margin-top: 12px;
            padding: 8px 20px;
        }
        button:hover {
            background-color: #1d4ed8;
        }
    </style>
</head>
<body>
    <div class="card">
        <h1>lanbell</h1>
        <p>This page is served by a lanbell beacon on your local network.
           Type a message and it will pop up on the host device.</p>
        <input type="text" id="message" placeholder="Enter a message..." />
        <button onclick="ring()">Send</button>
    </div>
    <script>
        function ring() {
            const value = document.getElementById('message').value;
            fetch('/log?message=' + encodeURIComponent(value))
                .then(response => response.text())
                .then(text => console.log('Sent:', text))
                .catch(err => console.error('Error:', err));
        }
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_heading_input_and_button() {
        assert!(LANDING_PAGE.contains("<h1>lanbell</h1>"));
        assert!(LANDING_PAGE.contains("<input"));
        assert!(LANDING_PAGE.contains("<button"));
    }

    #[test]
    fn test_page_script_targets_log_endpoint() {
        assert!(LANDING_PAGE.contains("/log?message="));
        assert!(LANDING_PAGE.contains("encodeURIComponent"));
    }
}
