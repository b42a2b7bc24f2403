//! Static pages and the signin result images.

pub const SIGNIN_SUCCESS_IMAGE: &[u8] = include_bytes!("../assets/success.gif");
pub const SIGNIN_FAILED_IMAGE: &[u8] = include_bytes!("../assets/failed.gif");
pub const IMAGE_CONTENT_TYPE: &str = "image/gif";

pub const SIGNUP_FORM: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign up</title></head>
<body>
  <h1>Sign up</h1>
  <form action="/signup" method="post" enctype="multipart/form-data">
    <label>Name <input type="text" name="name" required></label><br>
    <label>Email <input type="email" name="email" required></label><br>
    <label>Password <input type="password" name="password" required></label><br>
    <label>Profile image <input type="file" name="profile" accept="image/*" required></label><br>
    <button type="submit">Sign up</button>
  </form>
  <p>Already registered? <a href="/signin">Sign in</a></p>
</body>
</html>
"#;

pub const SIGNIN_FORM: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <h1>Sign in</h1>
  <form action="/signin" method="post">
    <label>Email <input type="email" name="email" required></label><br>
    <label>Password <input type="password" name="password" required></label><br>
    <button type="submit">Sign in</button>
  </form>
  <p>No account yet? <a href="/signup">Sign up</a></p>
</body>
</html>
"#;

pub const SIGNUP_SUCCESS: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Welcome</title></head>
<body>
  <h1>Signup successful</h1>
  <p><a href="/signin">Sign in</a></p>
</body>
</html>
"#;
