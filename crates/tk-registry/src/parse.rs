use tk_core::{Error, Offset2d, Point2d};

/// Translation part of an SVG-style `matrix(a,b,c,d,e,f)` transform.
pub fn parse_translation(transform: &str) -> Result<Offset2d, Error> {
    let malformed = || Error::MalformedTransform(transform.to_owned());

    let body = transform.trim();
    let body = body.strip_prefix("matrix(").unwrap_or(body);
    let body = body.strip_suffix(')').unwrap_or(body);

    let mut parts = body.rsplit(',');
    let dy = parts.next().ok_or_else(malformed)?;
    let dx = parts.next().ok_or_else(malformed)?;

    let dx: f64 = dx.trim().parse().map_err(|_| malformed())?;
    let dy: f64 = dy.trim().parse().map_err(|_| malformed())?;
    Ok(Offset2d::new(dx, dy))
}

/// Parses `M x y (L x y)* z?` into vertices.
pub fn parse_path(d: &str) -> Result<Vec<Point2d>, Error> {
    let malformed = |reason| Error::MalformedPath {
        path: d.to_owned(),
        reason,
    };

    let mut tokens = d.split_whitespace();
    if tokens.next() != Some("M") {
        return Err(malformed("path must start with 'M'"));
    }

    let mut points = vec![read_point(&mut tokens).ok_or_else(|| malformed("bad coordinate"))?];
    loop {
        match tokens.next() {
            None => break,
            Some("L") => {
                let p = read_point(&mut tokens).ok_or_else(|| malformed("bad coordinate"))?;
                points.push(p);
            }
            Some("z" | "Z") => {
                if tokens.next().is_some() {
                    return Err(malformed("data after closing 'z'"));
                }
                break;
            }
            Some(_) => return Err(malformed("unexpected token")),
        }
    }

    Ok(points)
}

fn read_point<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Point2d> {
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some(Point2d { x, y })
}
