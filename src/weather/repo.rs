use sqlx::{postgres::PgArguments, query::Query, PgPool, Postgres, Row};

use super::{model::WeatherData, model::WeatherRecord, repo_types::WeatherRow};

const SELECT_COLUMNS: &str = r#"
    SELECT id, city_name, user_id, coord_lon, coord_lat,
           weather_id, weather_main, weather_description, weather_icon, base,
           temp, feels_like, temp_min, temp_max, pressure, humidity, visibility,
           wind_speed, wind_deg, clouds_all, dt,
           sys_type, sys_id, sys_country, sys_sunrise, sys_sunset, timezone, created_at
    FROM weather_history
"#;

/// Binds the 25 weather columns in `city_name ..= timezone` order.
fn bind_data<'q>(
    q: Query<'q, Postgres, PgArguments>,
    d: &'q WeatherData,
) -> Query<'q, Postgres, PgArguments> {
    q.bind(&d.city_name)
        .bind(d.coord.lon)
        .bind(d.coord.lat)
        .bind(d.weather.id)
        .bind(&d.weather.main)
        .bind(&d.weather.description)
        .bind(&d.weather.icon)
        .bind(&d.base)
        .bind(d.main.temp)
        .bind(d.main.feels_like)
        .bind(d.main.temp_min)
        .bind(d.main.temp_max)
        .bind(d.main.pressure)
        .bind(d.main.humidity)
        .bind(d.visibility)
        .bind(d.wind.speed)
        .bind(d.wind.deg)
        .bind(d.clouds.all)
        .bind(d.dt)
        .bind(d.sys.kind)
        .bind(d.sys.id)
        .bind(&d.sys.country)
        .bind(d.sys.sunrise)
        .bind(d.sys.sunset)
        .bind(d.timezone)
}

pub async fn insert(db: &PgPool, data: &WeatherData, user_id: i64) -> sqlx::Result<i64> {
    let q = sqlx::query(
        r#"
        INSERT INTO weather_history (
            city_name, coord_lon, coord_lat,
            weather_id, weather_main, weather_description, weather_icon, base,
            temp, feels_like, temp_min, temp_max, pressure, humidity, visibility,
            wind_speed, wind_deg, clouds_all, dt,
            sys_type, sys_id, sys_country, sys_sunrise, sys_sunset, timezone,
            user_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
        RETURNING id
        "#,
    );
    let row = bind_data(q, data).bind(user_id).fetch_one(db).await?;
    row.try_get("id")
}

pub async fn get(db: &PgPool, id: i64) -> sqlx::Result<Option<WeatherRecord>> {
    let row = sqlx::query_as::<_, WeatherRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(WeatherRecord::from))
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<WeatherRecord>> {
    let rows = sqlx::query_as::<_, WeatherRow>(&format!(
        "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY id ASC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(WeatherRecord::from).collect())
}

/// Full replace of the weather columns; returns affected rows.
pub async fn update(db: &PgPool, record: &WeatherRecord) -> sqlx::Result<u64> {
    let q = sqlx::query(
        r#"
        UPDATE weather_history SET
            city_name = $1, coord_lon = $2, coord_lat = $3,
            weather_id = $4, weather_main = $5, weather_description = $6, weather_icon = $7,
            base = $8, temp = $9, feels_like = $10, temp_min = $11, temp_max = $12,
            pressure = $13, humidity = $14, visibility = $15,
            wind_speed = $16, wind_deg = $17, clouds_all = $18, dt = $19,
            sys_type = $20, sys_id = $21, sys_country = $22, sys_sunrise = $23, sys_sunset = $24,
            timezone = $25
        WHERE id = $26 AND user_id = $27
        "#,
    );
    let result = bind_data(q, &record.data)
        .bind(record.id)
        .bind(record.user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM weather_history WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM weather_history WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
