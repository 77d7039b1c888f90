//! Menu page served at `/`
//!
//! One form per operation. Each posts straight to its endpoint, so the
//! browser saves the attachment the server returns.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>PDF Toolkit</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.6rem; }
  details { border: 1px solid #ccc; border-radius: 6px; margin: 0.75rem 0; padding: 0.5rem 1rem; }
  summary { font-weight: 600; cursor: pointer; }
  form { display: grid; gap: 0.6rem; margin: 0.75rem 0 0.25rem; }
  button { justify-self: start; padding: 0.4rem 1.2rem; }
  .hint { color: #666; font-size: 0.9rem; margin: 0; }
</style>
</head>
<body>
<h1>PDF Toolkit</h1>

<details open>
  <summary>Merge PDF</summary>
  <form action="/api/merge" method="post" enctype="multipart/form-data">
    <p class="hint">Pages are joined in the order the files are selected.</p>
    <input type="file" name="files" accept=".pdf" multiple required>
    <button type="submit">Merge</button>
  </form>
</details>

<details>
  <summary>Compress PDF</summary>
  <form action="/api/compress" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept=".pdf" required>
    <button type="submit">Compress</button>
  </form>
</details>

<details>
  <summary>Split PDF</summary>
  <form action="/api/split" method="post" enctype="multipart/form-data">
    <p class="hint">Downloads a zip with one PDF per page.</p>
    <input type="file" name="file" accept=".pdf" required>
    <button type="submit">Split</button>
  </form>
</details>

<details>
  <summary>Convert From PDF</summary>
  <form action="/api/convert-from-pdf" method="post" enctype="multipart/form-data">
    <label>Convert to
      <select name="format">
        <option value="word">Word</option>
        <option value="excel">Excel</option>
        <option value="powerpoint">PowerPoint</option>
        <option value="image">Image</option>
      </select>
    </label>
    <input type="file" name="file" accept=".pdf" required>
    <button type="submit">Convert</button>
  </form>
</details>

<details>
  <summary>Convert To PDF</summary>
  <form action="/api/convert-to-pdf" method="post" enctype="multipart/form-data">
    <label>Convert from
      <select name="format">
        <option value="word">Word</option>
        <option value="excel">Excel</option>
        <option value="powerpoint">PowerPoint</option>
        <option value="image">Image</option>
      </select>
    </label>
    <input type="file" name="file" accept=".docx,.xlsx,.pptx,.jpg,.jpeg,.png" required>
    <button type="submit">Convert</button>
  </form>
</details>

</body>
</html>
"#;
