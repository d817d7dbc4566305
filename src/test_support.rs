//! Shared helpers for tests that need a live HTTP upstream.

use axum::Router;
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    format!("http://{addr}")
}

/// Two weather stations; the second sits about 370 m from the default home.
pub(crate) const SAMPLE_GML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2"
    xmlns:om="http://www.opengis.net/om/2.0"
    xmlns:omso="http://inspire.ec.europa.eu/schemas/omso/3.0"
    xmlns:swe="http://www.opengis.net/swe/1.0/gml32"
    gml:id="observations">
  <gml:featureMember>
    <omso:PointTimeSeriesObservation gml:id="obs-1">
      <om:featureOfInterest>
        <gml:Point gml:id="station-1">
          <gml:pos>2945000 4045000 376</gml:pos>
        </gml:Point>
      </om:featureOfInterest>
      <om:result>
        <swe:DataArray>
          <swe:field><swe:name name="Date"/></swe:field>
          <swe:field><swe:name name="Hour"/></swe:field>
          <swe:field>
            <swe:name name="Average Air Temperature 200cm above ground"/>
            <swe:Quantity><swe:uom code="°C"/></swe:Quantity>
          </swe:field>
          <swe:values>12.06.2024;14:30;17.1</swe:values>
        </swe:DataArray>
      </om:result>
    </omso:PointTimeSeriesObservation>
  </gml:featureMember>
  <gml:featureMember>
    <omso:PointTimeSeriesObservation gml:id="obs-2">
      <om:featureOfInterest>
        <gml:Point gml:id="station-2">
          <gml:pos>2958000 4026000 265</gml:pos>
        </gml:Point>
      </om:featureOfInterest>
      <om:result>
        <swe:DataArray>
          <swe:field><swe:name name="Date"/></swe:field>
          <swe:field><swe:name name="Hour"/></swe:field>
          <swe:field>
            <swe:name name="Average Air Temperature 200cm above ground"/>
            <swe:Quantity><swe:uom code="°C"/></swe:Quantity>
          </swe:field>
          <swe:field>
            <swe:name name="Relative Air Humidity 200cm above ground"/>
            <swe:Quantity><swe:uom code="%"/></swe:Quantity>
          </swe:field>
          <swe:field>
            <swe:name name="Maximum Air Temperature 200cm above ground"/>
            <swe:Quantity><swe:uom code="°C"/></swe:Quantity>
          </swe:field>
          <swe:field>
            <swe:name name="Minimum Air Temperature 200cm above ground"/>
            <swe:Quantity><swe:uom code="°C"/></swe:Quantity>
          </swe:field>
          <swe:field>
            <swe:name name="Precipitation (incl. snow and hail)"/>
            <swe:Quantity><swe:uom code="mm"/></swe:Quantity>
          </swe:field>
          <swe:values>
            12.06.2024;13:30;17.9;58;19.0;12.1;0.0
            12.06.2024;14:30;18.2;55;19.4;12.1;0.2
          </swe:values>
        </swe:DataArray>
      </om:result>
    </omso:PointTimeSeriesObservation>
  </gml:featureMember>
</gml:FeatureCollection>
"#;
